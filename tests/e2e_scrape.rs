// LogScraper - tests/e2e_scrape.rs
//
// End-to-end tests for the resolve -> process -> aggregate pipeline.
//
// These tests write real log files into temporary directories and run the
// public `LogScraper` API over them: glob expansion, archival lookup, gzip
// decoding, the remote copy phase over `LocalTransport`, aggregation and
// JSON serialisation. No mocks.

use chrono::{Local, NaiveDate};
use flate2::write::GzEncoder;
use flate2::Compression;
use logscraper::app::hooks::ScraperHooks;
use logscraper::app::scraper::LogScraper;
use logscraper::core::locator::are_logs_archived;
use logscraper::core::matcher::PatternMatcher;
use logscraper::core::model::{ScraperConfig, UserParams};
use logscraper::core::stats::calc_stats;
use logscraper::platform::remote::LocalTransport;
use logscraper::util::error::PatternError;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// Fixtures
// =============================================================================

const ARCHIVE_DIR: &str = "archived";
const LOG_FILE: &str = "log*.log";
const LOG_FILE_REGEX: &str = r"log\d+";

const LOG_1: &str = "
My name is Judge.
My name is Franklin.
Judge my name?
My name is Judge.
              ";

const LOG_2: &str = "
The weather is sunny.
The time is noon.
My name is Judge.
What's my name?
My name is Franklin.
The weather is rainy.
The weather is icy.
              ";

/// Temp log directory holding log1.log, log2.log and their archived
/// 20150301 copies under `archived/`.
fn log_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join(ARCHIVE_DIR);
    fs::create_dir(&archive).unwrap();
    fs::write(dir.path().join("log1.log"), LOG_1).unwrap();
    fs::write(dir.path().join("log2.log"), LOG_2).unwrap();
    fs::write(archive.join("log1-20150301.log"), LOG_1).unwrap();
    fs::write(archive.join("log2-20150301.log"), LOG_2).unwrap();
    dir
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A deployment-specific scraper: two name regexes, archive under
/// `<log dir>/archived`.
struct NameHooks {
    archive: PathBuf,
}

impl ScraperHooks for NameHooks {
    fn init_regexes(&self) -> Result<Vec<PatternMatcher>, PatternError> {
        Ok(vec![
            PatternMatcher::new("no_group", r"My name is Judge\.$")?,
            PatternMatcher::new("group", r"My name is (?P<name>\w+)\.$")?,
        ])
    }

    fn archived_file_path(&self, _config: &ScraperConfig) -> Option<PathBuf> {
        Some(self.archive.clone())
    }
}

fn options_scraper(dir: &Path, params: UserParams) -> LogScraper {
    let config = ScraperConfig {
        default_path: dir.to_path_buf(),
        default_filename: LOG_FILE.to_string(),
        days_before_archiving: 1,
        ..Default::default()
    };
    let hooks = Arc::new(NameHooks {
        archive: dir.join(ARCHIVE_DIR),
    });
    let mut scraper = LogScraper::from_hooks(config, hooks).unwrap();
    scraper.set_user_params(params).unwrap();
    scraper
}

fn name_scrape_json(file_1: &Path, file_2: &Path) -> serde_json::Value {
    json!({
        "regexes": {
            "no_group": {"group_hits": {}, "total_hits": 3},
            "group": {"group_hits": {"name": {"Franklin": 2, "Judge": 3}}, "total_hits": 5}
        },
        "file_hits": [
            {
                "regexes": {
                    "no_group": {"group_hits": {}, "total_hits": 2},
                    "group": {"group_hits": {"name": {"Franklin": 1, "Judge": 2}}, "total_hits": 3}
                },
                "filename": path_str(file_1)
            },
            {
                "regexes": {
                    "no_group": {"group_hits": {}, "total_hits": 1},
                    "group": {"group_hits": {"name": {"Franklin": 1, "Judge": 1}}, "total_hits": 2}
                },
                "filename": path_str(file_2)
            }
        ]
    })
}

// =============================================================================
// Scenarios
// =============================================================================

/// Plain scraper over an explicit glob: counts, stats and view mode.
#[test]
fn e2e_base_scraper() {
    let dir = log_dir();
    let mut scraper = LogScraper::new(ScraperConfig::default()).unwrap();
    scraper
        .set_user_params(UserParams {
            filename: Some(path_str(&dir.path().join(LOG_FILE))),
            ..Default::default()
        })
        .unwrap();
    scraper
        .add_regex("name_is_judge", r"My name is Judge\.$")
        .unwrap();
    scraper
        .add_regex("key_value_regex", r"The (?P<key>\w+) is (?P<value>\w+)\.$")
        .unwrap();

    let results = scraper.get_log_data().expect("log files exist");
    let expected = json!({
        "regexes": {
            "key_value_regex": {
                "group_hits": {
                    "key": {"time": 1, "weather": 3},
                    "value": {"icy": 1, "noon": 1, "rainy": 1, "sunny": 1}
                },
                "total_hits": 4
            },
            "name_is_judge": {"group_hits": {}, "total_hits": 3}
        },
        "file_hits": [
            {
                "regexes": {
                    "key_value_regex": {"group_hits": {"key": {}, "value": {}}, "total_hits": 0},
                    "name_is_judge": {"group_hits": {}, "total_hits": 2}
                },
                "filename": path_str(&dir.path().join("log1.log"))
            },
            {
                "regexes": {
                    "key_value_regex": {
                        "group_hits": {
                            "key": {"time": 1, "weather": 3},
                            "value": {"icy": 1, "noon": 1, "rainy": 1, "sunny": 1}
                        },
                        "total_hits": 4
                    },
                    "name_is_judge": {"group_hits": {}, "total_hits": 1}
                },
                "filename": path_str(&dir.path().join("log2.log"))
            }
        ]
    });
    assert_eq!(serde_json::to_value(&results).unwrap(), expected);

    let stats = calc_stats(Some(&results.regexes["key_value_regex"].group_hits["key"]));
    assert_eq!(stats.max_key.as_deref(), Some("weather"));
    assert_eq!(stats.max_count, 3);
    assert_eq!(stats.min_key.as_deref(), Some("time"));
    assert_eq!(stats.min_count, 1);
    assert_eq!(stats.avg_count, 2.0);

    let mut out = Vec::new();
    scraper
        .view_regex_hits()
        .expect("log files exist")
        .write_to(&mut out)
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "My name is Judge.\n\
         My name is Judge.\n\
         The weather is sunny.\n\
         The time is noon.\n\
         My name is Judge.\n\
         The weather is rainy.\n\
         The weather is icy.\n"
    );
}

/// An old date resolves to the archive directory.
#[test]
fn e2e_archived_scraping() {
    let dir = log_dir();
    let scraper = options_scraper(
        dir.path(),
        UserParams {
            date: Some(day(2015, 3, 1)),
            debug: true,
            ..Default::default()
        },
    );

    let results = scraper.get_log_data().expect("archived files exist");
    let archive = dir.path().join(ARCHIVE_DIR);
    assert_eq!(
        serde_json::to_value(&results).unwrap(),
        name_scrape_json(
            &archive.join("log1-20150301.log"),
            &archive.join("log2-20150301.log")
        )
    );

    let today = Local::now().date_naive();
    assert!(!are_logs_archived(1, Some(today), today));
}

/// A date inside the threshold is still read from the live directory.
#[test]
fn e2e_recent_date_reads_live_directory() {
    let dir = log_dir();
    let today = day(2015, 3, 2);
    fs::write(dir.path().join("log1-20150301.log"), LOG_1).unwrap();

    let scraper = options_scraper(
        dir.path(),
        UserParams {
            date: Some(day(2015, 3, 1)),
            ..Default::default()
        },
    )
    .with_today(today);

    let results = scraper.get_log_data().expect("live dated file exists");
    assert!(results.file_hits.is_none(), "single file has no breakdown");
    assert_eq!(results.regexes["group"].total_hits, 3);
}

/// Archived files may be gzip-compressed; the trailing wildcard picks them up.
#[test]
fn e2e_gzipped_archive() {
    let dir = log_dir();
    let archive = dir.path().join(ARCHIVE_DIR);
    let gz = archive.join("log3-20150301.log.gz");
    let mut enc = GzEncoder::new(fs::File::create(&gz).unwrap(), Compression::default());
    enc.write_all(LOG_1.as_bytes()).unwrap();
    enc.finish().unwrap();

    let scraper = options_scraper(
        dir.path(),
        UserParams {
            date: Some(day(2015, 3, 1)),
            ..Default::default()
        },
    );
    let results = scraper.get_log_data().expect("archived files exist");
    let file_hits = results.file_hits.expect("three files");
    assert_eq!(file_hits.len(), 3);
    assert_eq!(file_hits[2].filename, gz);
    assert_eq!(file_hits[2].regexes["group"].total_hits, 3);
    assert_eq!(results.regexes["group"].group_hits["name"]["Judge"], 5);
}

/// Explicit filename with the deployment hooks.
#[test]
fn e2e_good_filepath() {
    let dir = log_dir();
    let scraper = options_scraper(
        dir.path(),
        UserParams {
            filename: Some(path_str(&dir.path().join(LOG_FILE))),
            debug: true,
            ..Default::default()
        },
    );

    let results = scraper.get_log_data().expect("log files exist");
    assert_eq!(
        serde_json::to_value(&results).unwrap(),
        name_scrape_json(&dir.path().join("log1.log"), &dir.path().join("log2.log"))
    );
}

/// Comma-separated overrides are merged, sorted and deduplicated.
#[test]
fn e2e_comma_separated_filenames() {
    let dir = log_dir();
    let list = format!(
        "{},{}",
        path_str(&dir.path().join("log2.log")),
        path_str(&dir.path().join(LOG_FILE))
    );
    let scraper = options_scraper(
        dir.path(),
        UserParams {
            filename: Some(list),
            ..Default::default()
        },
    );
    let results = scraper.get_log_data().unwrap();
    let names: Vec<_> = results
        .file_hits
        .unwrap()
        .into_iter()
        .map(|r| r.filename)
        .collect();
    assert_eq!(
        names,
        vec![dir.path().join("log1.log"), dir.path().join("log2.log")]
    );
}

/// Nothing to scan yields `None`, not an error.
#[test]
fn e2e_bad_filepath() {
    let mut scraper = LogScraper::new(ScraperConfig::default()).unwrap();
    assert!(scraper.get_log_data().is_none());

    scraper
        .set_user_params(UserParams {
            filename: Some("/this/path/does/not/exist/".to_string()),
            debug: true,
            ..Default::default()
        })
        .unwrap();
    assert!(scraper.get_log_data().is_none());
}

/// Forced copy of "remote" files served by the local filesystem.
#[test]
fn e2e_remote_file_copying() {
    let dir = log_dir();
    let tmp_remote = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("log1-this_box.log"), LOG_1).unwrap();
    fs::write(dir.path().join("log2-this_box.log"), LOG_2).unwrap();

    let config = ScraperConfig {
        default_path: dir.path().to_path_buf(),
        default_filename: LOG_FILE.to_string(),
        tmp_path: Some(tmp_remote.path().to_path_buf()),
        local_copy_lifetime_hours: 1,
        levels_to_boxes: BTreeMap::from([("this_box".to_string(), "this-host".to_string())]),
        filename_regex: LOG_FILE_REGEX.to_string(),
        force_copy: true,
        ..Default::default()
    };
    let mut scraper = LogScraper::new(config)
        .unwrap()
        .with_hostname("this-host")
        .with_transport(Arc::new(LocalTransport));
    scraper.add_regex("group", r"My name is (?P<name>\w+)\.$").unwrap();
    scraper
        .set_user_params(UserParams {
            level: Some("this_box".to_string()),
            filename: Some(path_str(&dir.path().join("log1.log"))),
            debug: true,
            ..Default::default()
        })
        .unwrap();

    let results = scraper.get_log_data().expect("remote files copied");
    for name in ["log1-this_box.log", "log2-this_box.log"] {
        assert!(
            tmp_remote.path().join(format!("this_box_{name}")).is_file(),
            "missing local copy of {name}"
        );
    }
    assert_eq!(results.regexes["group"].total_hits, 5);
    let scraped: Vec<_> = results
        .file_hits
        .unwrap()
        .into_iter()
        .map(|r| r.filename)
        .collect();
    assert_eq!(
        scraped,
        vec![
            tmp_remote.path().join("this_box_log1-this_box.log"),
            tmp_remote.path().join("this_box_log2-this_box.log"),
        ]
    );
}

/// Running the same scrape twice gives the same result.
#[test]
fn e2e_idempotent() {
    let dir = log_dir();
    let scraper = options_scraper(
        dir.path(),
        UserParams {
            filename: Some(path_str(&dir.path().join(LOG_FILE))),
            ..Default::default()
        },
    );
    let first = scraper.get_log_data().unwrap();
    let second = scraper.get_log_data().unwrap();
    assert_eq!(first, second);
}

/// Aggregate totals equal the sum of the per-file totals.
#[test]
fn e2e_aggregate_equals_sum_of_files() {
    let dir = log_dir();
    let scraper = options_scraper(
        dir.path(),
        UserParams {
            filename: Some(path_str(&dir.path().join(LOG_FILE))),
            ..Default::default()
        },
    );
    let results = scraper.get_log_data().unwrap();
    let files = results.file_hits.as_ref().unwrap();
    for (name, hits) in &results.regexes {
        let per_file: u64 = files.iter().map(|f| f.regexes[name].total_hits).sum();
        assert_eq!(hits.total_hits, per_file, "regex {name}");
        for (group, values) in &hits.group_hits {
            let total: u64 = values.values().sum();
            let per_file: u64 = files
                .iter()
                .map(|f| f.regexes[name].group_hits[group].values().sum::<u64>())
                .sum();
            assert_eq!(total, per_file, "group {group} of {name}");
        }
    }
}
