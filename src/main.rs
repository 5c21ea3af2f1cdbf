// LogScraper - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Scraper construction from config regexes plus --regex overrides
// 4. Output: text report, per-file breakdown, JSON, or matching lines

use chrono::NaiveDate;
use clap::Parser;
use logscraper::app::hooks::{ConfigHooks, DefaultHooks, ScraperHooks};
use logscraper::app::report;
use logscraper::app::scraper::LogScraper;
use logscraper::core::model::{ScraperConfig, UserParams};
use logscraper::platform::config::{self, LoadedConfig};
use logscraper::util::{constants, logging};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// LogScraper - run named regexes over log files and tally the hits.
///
/// Files come from the config's default path (optionally for a date and a
/// level) or from an explicit comma-separated list of globs.
#[derive(Parser, Debug)]
#[command(name = "logscraper", version, about)]
struct Cli {
    /// TOML config file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Extra regex as NAME=PATTERN (repeatable).
    #[arg(short = 'r', long = "regex", value_name = "NAME=PATTERN", value_parser = parse_regex_arg)]
    regex: Vec<(String, String)>,

    /// Explicit file or comma-separated globs; overrides the default path.
    #[arg(short = 'f', long = "file")]
    file: Option<String>,

    /// Day to scan, as YYYYMMDD.
    #[arg(long = "date", value_parser = parse_date_arg)]
    date: Option<NaiveDate>,

    /// Level (environment) whose box holds the logs.
    #[arg(short = 'l', long = "level")]
    level: Option<String>,

    /// Print every matching line instead of counting.
    #[arg(long = "view")]
    view: bool,

    /// Also print the report for each file.
    #[arg(long = "per-file")]
    per_file: bool,

    /// Print the result as JSON.
    #[arg(long = "json", conflicts_with = "view")]
    json: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_regex_arg(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, pattern)) if !name.is_empty() && !pattern.is_empty() => {
            Ok((name.to_string(), pattern.to_string()))
        }
        _ => Err(format!("expected NAME=PATTERN, got '{s}'")),
    }
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, constants::DATE_FORMAT)
        .map_err(|e| format!("expected a date as YYYYMMDD, got '{s}': {e}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref().map(config::load_config).transpose() {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::init(cli.debug, None);
            tracing::error!(error = %e, "Failed to load config");
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    logging::init(
        cli.debug,
        loaded.as_ref().and_then(|l| l.log_level.as_deref()),
    );
    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "{} starting",
        constants::APP_NAME
    );

    match run(&cli, loaded) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Scrape failed");
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli, loaded: Option<LoadedConfig>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (scraper_config, hooks) = match loaded {
        Some(loaded) => {
            for warning in &loaded.warnings {
                tracing::warn!("{warning}");
            }
            let hooks: Arc<dyn ScraperHooks> = Arc::new(ConfigHooks::new(loaded.regexes));
            (loaded.scraper, hooks)
        }
        None => {
            let hooks: Arc<dyn ScraperHooks> = Arc::new(DefaultHooks);
            (ScraperConfig::default(), hooks)
        }
    };

    let mut scraper = LogScraper::from_hooks(scraper_config, hooks)?;
    tracing::debug!(host = scraper.hostname(), "Scraping from this host");
    for (name, pattern) in &cli.regex {
        scraper.add_regex(name, pattern)?;
    }
    if scraper.regexes().is_empty() {
        eprintln!("Error: no regexes configured; pass --regex NAME=PATTERN or a config with [[regex]] entries");
        return Ok(ExitCode::from(2));
    }

    scraper.set_user_params(UserParams {
        date: cli.date,
        level: cli.level.clone(),
        filename: cli.file.clone(),
        debug: cli.debug,
        ..Default::default()
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.view {
        let Some(matches) = scraper.view_regex_hits() else {
            eprintln!("No log files found");
            return Ok(ExitCode::from(1));
        };
        matches.write_to(&mut out)?;
        out.flush()?;
        tracing::info!(lines = matches.total_lines(), "Matching lines written");
        return Ok(ExitCode::SUCCESS);
    }

    let Some(result) = scraper.get_log_data() else {
        eprintln!("No log files found");
        return Ok(ExitCode::from(1));
    };

    if cli.json {
        report::write_json(&result, &mut out)?;
    } else {
        if cli.per_file {
            report::write_per_file(&result, &mut out)?;
        }
        report::write_report(&result, &mut out)?;
    }
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}
