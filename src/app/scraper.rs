// LogScraper - app/scraper.rs
//
// The scrape orchestrator.
//
// Lifecycle of one `get_log_data` call:
//   1. RESOLVE: the locator turns config + user params into a file list. When
//      logs live on another box the directory is listed through the transport
//      and every selected file is copied into the local-copy cache.
//   2. PROCESS: each file is scraped on a rayon pool sized by
//      `processor_count`; results come back in resolution order.
//   3. AGGREGATE: per-file results are merged into one `AggregateResult`.
//
// Every per-file failure (unreadable file, failed copy) is logged and the
// file is dropped; no condition in normal operation aborts a scrape.

use crate::app::hooks::{DefaultHooks, ScraperHooks};
use crate::core::aggregate::aggregate;
use crate::core::locator::{FileLocator, RemoteListing, Resolution};
use crate::core::matcher::PatternMatcher;
use crate::core::model::{
    AggregateResult, FileLineMatches, RegexLineMatches, ScrapeResult, ScraperConfig, UserParams,
};
use crate::core::process;
use crate::platform::config::resolve_tmp_path;
use crate::platform::fs::open_log_file;
use crate::platform::host::current_hostname;
use crate::platform::remote::{LocalCopyCache, RemoteTransport, UnsupportedTransport};
use crate::util::constants;
use crate::util::error::{PatternError, Result, ScraperError};
use chrono::{Local, NaiveDate};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Runs a set of named regexes over the log files selected by its config and
/// the current user parameters.
pub struct LogScraper {
    config: ScraperConfig,
    params: UserParams,
    regexes: Vec<PatternMatcher>,
    hooks: Arc<dyn ScraperHooks>,
    transport: Arc<dyn RemoteTransport>,
    hostname: String,
    /// Fixed "today" for archival decisions; `None` uses the local date.
    today: Option<NaiveDate>,
}

impl std::fmt::Debug for LogScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogScraper")
            .field("config", &self.config)
            .field("params", &self.params)
            .field("regexes", &self.regexes)
            .field("hostname", &self.hostname)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

impl LogScraper {
    /// Scraper with no initial regexes.
    pub fn new(config: ScraperConfig) -> Result<Self> {
        Self::from_hooks(config, Arc::new(DefaultHooks))
    }

    /// Scraper whose regexes, archive location and parameter validation come
    /// from `hooks`.
    pub fn from_hooks(config: ScraperConfig, hooks: Arc<dyn ScraperHooks>) -> Result<Self> {
        let mut scraper = Self {
            config,
            params: UserParams::default(),
            regexes: Vec::new(),
            hooks,
            transport: Arc::new(UnsupportedTransport),
            hostname: current_hostname(),
            today: None,
        };
        for matcher in scraper.hooks.init_regexes()? {
            scraper.push_matcher(matcher)?;
        }
        tracing::debug!(
            regexes = scraper.regexes.len(),
            host = %scraper.hostname,
            "Scraper created"
        );
        Ok(scraper)
    }

    /// Use `transport` for remote listings and copies.
    pub fn with_transport(mut self, transport: Arc<dyn RemoteTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Override the host name compared against the level -> box mapping.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Pin the date archival decisions are made against.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    // -------------------------------------------------------------------------
    // Regex management
    // -------------------------------------------------------------------------

    /// Compile and append a regex. Names must be unique; on any error the
    /// existing regexes are untouched.
    pub fn add_regex(&mut self, name: &str, pattern: &str) -> std::result::Result<(), PatternError> {
        let matcher = PatternMatcher::new(name, pattern)?;
        self.push_matcher(matcher)
    }

    fn push_matcher(&mut self, matcher: PatternMatcher) -> std::result::Result<(), PatternError> {
        if self.regexes.iter().any(|m| m.name() == matcher.name()) {
            return Err(PatternError::DuplicateName {
                name: matcher.name().to_string(),
            });
        }
        tracing::debug!(regex = matcher.name(), pattern = matcher.pattern(), "Regex added");
        self.regexes.push(matcher);
        Ok(())
    }

    pub fn clear_regexes(&mut self) {
        self.regexes.clear();
    }

    pub fn regexes(&self) -> &[PatternMatcher] {
        &self.regexes
    }

    // -------------------------------------------------------------------------
    // User parameters
    // -------------------------------------------------------------------------

    /// Replace the user parameters after validating them. Rejected parameters
    /// leave the current ones in place.
    pub fn set_user_params(&mut self, params: UserParams) -> Result<()> {
        if let Some(level) = params.level.as_deref() {
            if self.config.box_for_level(level).is_none() {
                let known: Vec<&str> = self.config.levels_to_boxes.keys().map(String::as_str).collect();
                return Err(ScraperError::InvalidArgument {
                    message: format!(
                        "unknown level '{level}' (known levels: {})",
                        if known.is_empty() {
                            "none configured".to_string()
                        } else {
                            known.join(", ")
                        }
                    ),
                });
            }
        }
        self.hooks.validate_user_params(&params)?;
        self.params = params;
        Ok(())
    }

    pub fn user_params(&self) -> &UserParams {
        &self.params
    }

    // -------------------------------------------------------------------------
    // Scraping
    // -------------------------------------------------------------------------

    /// Scrape the resolved files. Returns `None` (after logging why) when no
    /// files could be found.
    pub fn get_log_data(&self) -> Option<AggregateResult> {
        match self.try_get_log_data() {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(error = %e, "No log data");
                None
            }
        }
    }

    /// Scrape the resolved files, reporting a missing file set as
    /// `ScraperError::NoFilesFound`.
    pub fn try_get_log_data(&self) -> Result<AggregateResult> {
        let files = self.resolve_files()?;
        let results: Vec<ScrapeResult> = self.run_per_file(&files, |path| self.scrape_file(path));
        tracing::info!(
            files = files.len(),
            processed = results.len(),
            "Scrape complete"
        );
        Ok(aggregate(&self.regexes, results, files.len()))
    }

    /// Every line matching any regex (unanchored), per file. No counting.
    pub fn view_regex_hits(&self) -> Option<RegexLineMatches> {
        let files = match self.resolve_files() {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "No lines to view");
                return None;
            }
        };
        let matched: Vec<FileLineMatches> = self.run_per_file(&files, |path| self.view_file(path));
        Some(RegexLineMatches { files: matched })
    }

    fn scrape_file(&self, path: &Path) -> Option<ScrapeResult> {
        let scraped =
            open_log_file(path).and_then(|reader| process::scrape_lines(reader, path, &self.regexes));
        match scraped {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to scrape file, skipping");
                None
            }
        }
    }

    fn view_file(&self, path: &Path) -> Option<FileLineMatches> {
        let found = open_log_file(path)
            .and_then(|reader| process::find_matching_lines(reader, path, &self.regexes));
        match found {
            Ok(lines) => Some(lines),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to read file, skipping");
                None
            }
        }
    }

    /// Apply `work` to every file on a pool of `processor_count` threads,
    /// keeping results in input order. Falls back to the calling thread if
    /// the pool cannot be built.
    fn run_per_file<T, F>(&self, files: &[PathBuf], work: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Path) -> Option<T> + Sync + Send,
    {
        let threads = self
            .config
            .processor_count
            .clamp(1, constants::MAX_PROCESSOR_COUNT);
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| files.par_iter().filter_map(|p| work(p.as_path())).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not build worker pool, processing sequentially");
                files.iter().filter_map(|p| work(p.as_path())).collect()
            }
        }
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    fn resolve_files(&self) -> Result<Vec<PathBuf>> {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let archive_dir = self.hooks.archived_file_path(&self.config);
        let locator = FileLocator::new(
            &self.config,
            &self.params,
            archive_dir.as_deref(),
            &self.hostname,
            today,
        );

        let files = match locator.resolve() {
            Resolution::Local(files) => files,
            Resolution::Remote(listing) => self.fetch_remote(&listing),
        };

        if self.params.debug {
            for matcher in &self.regexes {
                tracing::debug!(
                    regex = matcher.name(),
                    pattern = matcher.regex().as_str(),
                    groups = ?matcher.groups(),
                    "Active regex"
                );
            }
            tracing::debug!(files = ?files, "Files to process");
        }

        if files.is_empty() {
            return Err(ScraperError::NoFilesFound {
                location: locator.location_description(),
            });
        }
        Ok(files)
    }

    /// List the remote directory, select matching entries and copy them into
    /// the local-copy cache. Returns the local copies that succeeded.
    fn fetch_remote(&self, listing: &RemoteListing) -> Vec<PathBuf> {
        let remote_files = match self.list_remote(listing) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(host = %listing.host, error = %e, "Remote listing failed");
                return Vec::new();
            }
        };
        tracing::debug!(
            host = %listing.host,
            files = remote_files.len(),
            "Remote files selected"
        );

        let cache = LocalCopyCache::new(
            resolve_tmp_path(&self.config),
            self.config.local_copy_lifetime_hours,
        );
        let transport = self.transport.as_ref();
        self.run_per_file(&remote_files, |remote| {
            match cache.fetch(transport, &listing.host, &listing.level, remote) {
                Ok(local) => Some(local),
                Err(e) => {
                    tracing::warn!(
                        host = %listing.host,
                        file = %remote.display(),
                        error = %e,
                        "Remote copy failed, skipping file"
                    );
                    None
                }
            }
        })
    }

    fn list_remote(&self, listing: &RemoteListing) -> Result<Vec<PathBuf>> {
        let mut session = self.transport.connect(
            &listing.host,
            Duration::from_secs(constants::REMOTE_CONNECT_TIMEOUT_SECS),
        )?;
        let entries = session.list_dir(&listing.dir)?;
        Ok(listing.select(&entries)?)
    }
}
