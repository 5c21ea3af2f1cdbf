// LogScraper - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// Counts are kept in `BTreeMap`s so every emitted mapping is sorted by key
// regardless of the order lines were encountered in.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::core::matcher::PatternMatcher;

/// Observed group value -> number of occurrences.
pub type ValueCounts = BTreeMap<String, u64>;

/// Group name -> value counts.
pub type GroupHits = BTreeMap<String, ValueCounts>;

// =============================================================================
// Hit counts
// =============================================================================

/// Hits recorded for one regex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegexHits {
    /// Number of lines the regex matched.
    pub total_hits: u64,

    /// Per named group, the count of every captured value.
    pub group_hits: GroupHits,
}

impl RegexHits {
    /// Zeroed hits with an empty mapping for each declared group.
    pub fn for_matcher(matcher: &PatternMatcher) -> Self {
        Self {
            total_hits: 0,
            group_hits: matcher
                .groups()
                .iter()
                .map(|g| (g.clone(), ValueCounts::new()))
                .collect(),
        }
    }

    /// Add `other`'s counts into `self`, summing identical group values.
    pub fn merge(&mut self, other: &RegexHits) {
        self.total_hits += other.total_hits;
        for (group, values) in &other.group_hits {
            let target = self.group_hits.entry(group.clone()).or_default();
            for (value, count) in values {
                *target.entry(value.clone()).or_insert(0) += count;
            }
        }
    }
}

/// Regex name -> hits.
pub type RegexResults = BTreeMap<String, RegexHits>;

/// Zeroed results for every configured matcher.
pub fn empty_results(matchers: &[PatternMatcher]) -> RegexResults {
    matchers
        .iter()
        .map(|m| (m.name().to_string(), RegexHits::for_matcher(m)))
        .collect()
}

/// Result of scraping a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeResult {
    pub filename: PathBuf,
    pub regexes: RegexResults,
}

/// Result of a full scrape across all resolved files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    /// Hits summed across every processed file.
    pub regexes: RegexResults,

    /// Per-file results in resolution order. Only present when more than one
    /// file was processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_hits: Option<Vec<ScrapeResult>>,
}

// =============================================================================
// Statistics
// =============================================================================

/// Min / max / average over a value -> count mapping.
///
/// The zero record (`Default`) is returned for empty mappings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub max_key: Option<String>,
    pub min_key: Option<String>,
    pub max_count: u64,
    pub min_count: u64,
    pub avg_count: f64,
}

// =============================================================================
// Line matches ("view matches" mode)
// =============================================================================

/// A line that satisfied a regex search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedLine {
    /// 1-based line number within the file.
    pub line_number: u64,
    pub text: String,
}

/// Lines matched by one regex in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegexLines {
    pub regex: String,
    pub lines: Vec<MatchedLine>,
}

/// Matching lines of one file, grouped by regex in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLineMatches {
    pub filename: PathBuf,
    pub regexes: Vec<RegexLines>,
}

/// Matching lines across every resolved file, in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegexLineMatches {
    pub files: Vec<FileLineMatches>,
}

impl RegexLineMatches {
    /// Write matched lines file by file in line order. A line matched by
    /// several regexes is written once per regex, in configuration order.
    pub fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        for file in &self.files {
            let mut hits: Vec<(u64, usize, &str)> = file
                .regexes
                .iter()
                .enumerate()
                .flat_map(|(idx, r)| {
                    r.lines
                        .iter()
                        .map(move |l| (l.line_number, idx, l.text.as_str()))
                })
                .collect();
            hits.sort_by_key(|&(line, idx, _)| (line, idx));
            for (_, _, text) in hits {
                writeln!(out, "{text}")?;
            }
        }
        Ok(())
    }

    /// Total number of matched lines across all files and regexes.
    pub fn total_lines(&self) -> usize {
        self.files
            .iter()
            .flat_map(|f| &f.regexes)
            .map(|r| r.lines.len())
            .sum()
    }
}

// =============================================================================
// Scraper configuration
// =============================================================================

/// Invocation-independent settings of a scraper.
///
/// All limits reference named constants from `util::constants`; the platform
/// layer builds this from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// Directory where live logs are found (locally or on the remote box).
    pub default_path: PathBuf,

    /// Default log filename; wildcards allowed. Its extension is re-appended
    /// after the box and date components when composing names.
    pub default_filename: String,

    /// Days a log stays in `default_path` before it is archived. 0 disables
    /// archival.
    pub days_before_archiving: u32,

    /// Directory holding archived logs.
    pub archive_path: Option<PathBuf>,

    /// Regex template used to select remote directory entries. The level and
    /// date are appended like the components of a composed file name.
    pub filename_regex: String,

    /// Copy remote files even when the level maps to the current host.
    pub force_copy: bool,

    /// Logical level name -> host name.
    pub levels_to_boxes: BTreeMap<String, String>,

    /// Hours a local copy of a remote file stays fresh.
    pub local_copy_lifetime_hours: u64,

    /// Where remote files are copied to. `None` uses the platform cache dir.
    pub tmp_path: Option<PathBuf>,

    /// Worker pool size for per-file processing.
    pub processor_count: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        use crate::util::constants;
        Self {
            default_path: PathBuf::new(),
            default_filename: String::new(),
            days_before_archiving: constants::DEFAULT_DAYS_BEFORE_ARCHIVING,
            archive_path: None,
            filename_regex: String::new(),
            force_copy: false,
            levels_to_boxes: BTreeMap::new(),
            local_copy_lifetime_hours: constants::DEFAULT_LOCAL_COPY_LIFETIME_HOURS,
            tmp_path: None,
            processor_count: constants::DEFAULT_PROCESSOR_COUNT,
        }
    }
}

impl ScraperConfig {
    /// Host mapped to `level`, if any.
    pub fn box_for_level(&self, level: &str) -> Option<&str> {
        self.levels_to_boxes.get(level).map(String::as_str)
    }
}

// =============================================================================
// User parameters
// =============================================================================

/// Invocation-dependent parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserParams {
    /// Day whose logs should be scanned.
    pub date: Option<NaiveDate>,

    /// Logical environment name, mapped to a box via `levels_to_boxes`.
    pub level: Option<String>,

    /// Explicit filename or comma-separated globs; overrides the default path.
    pub filename: Option<String>,

    /// Log the regexes and the final file list at debug level.
    pub debug: bool,

    /// Free-form parameters for custom hooks.
    pub extra: HashMap<String, String>,
}
