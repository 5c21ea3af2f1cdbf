// LogScraper - core/locator.rs
//
// Resolves user parameters plus archival policy into the list of files to
// scan.
//
// Architecture note: like discovery in a directory walker, this module uses
// `glob` as an OS abstraction and only inspects file *metadata*. Remote
// listings are not fetched here: when logs live on another box the locator
// returns a `RemoteListing` plan and the app layer fetches the directory
// entries through the transport, then hands them back to `select`.

use crate::core::model::{ScraperConfig, UserParams};
use crate::util::constants;
use crate::util::error::PatternError;
use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};

// =============================================================================
// Resolution plan
// =============================================================================

/// Outcome of file resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Files on the local filesystem, existing regular files, sorted.
    Local(Vec<PathBuf>),

    /// Files must be listed and fetched from a remote box.
    Remote(RemoteListing),
}

/// Where and how to list log files on a remote box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteListing {
    /// Host to connect to.
    pub host: String,

    /// Level the host was resolved from; prefixes local copies.
    pub level: String,

    /// Remote directory to list.
    pub dir: PathBuf,

    /// Regex that directory entries must match (anchored at the start).
    pub name_pattern: String,
}

impl RemoteListing {
    /// Pick the directory entries matching `name_pattern`, joined with `dir`.
    ///
    /// Only the matched portion of each entry name is kept.
    pub fn select(&self, entries: &[String]) -> Result<Vec<PathBuf>, PatternError> {
        let regex = Regex::new(&self.name_pattern).map_err(|e| PatternError::InvalidRegex {
            name: "filename_regex".to_string(),
            pattern: self.name_pattern.clone(),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .iter()
            .filter_map(|entry| {
                regex
                    .find(entry)
                    .filter(|m| m.start() == 0)
                    .map(|m| self.dir.join(m.as_str()))
            })
            .collect();
        files.sort();
        files.dedup();
        Ok(files)
    }
}

// =============================================================================
// Locator
// =============================================================================

/// Resolves the files a scrape should run on.
#[derive(Debug)]
pub struct FileLocator<'a> {
    config: &'a ScraperConfig,
    params: &'a UserParams,
    archive_dir: Option<&'a Path>,
    current_host: &'a str,
    today: NaiveDate,
}

impl<'a> FileLocator<'a> {
    pub fn new(
        config: &'a ScraperConfig,
        params: &'a UserParams,
        archive_dir: Option<&'a Path>,
        current_host: &'a str,
        today: NaiveDate,
    ) -> Self {
        Self {
            config,
            params,
            archive_dir,
            current_host,
            today,
        }
    }

    fn level_box(&self) -> Option<&'a str> {
        self.params
            .level
            .as_deref()
            .and_then(|level| self.config.box_for_level(level))
    }

    /// Whether the requested date's logs have moved to the archive.
    pub fn logs_archived(&self) -> bool {
        are_logs_archived(
            self.config.days_before_archiving,
            self.params.date,
            self.today,
        )
    }

    /// Whether files must be fetched from a remote box.
    ///
    /// True when a level is given, logs are not archived, and either
    /// force-copy is set or the level's box is not the current host.
    pub fn is_remote(&self) -> bool {
        if self.params.level.is_none() || self.logs_archived() {
            return false;
        }
        self.config.force_copy || self.level_box() != Some(self.current_host)
    }

    /// Path (possibly containing wildcards) where logs should be globbed for
    /// the requested date and level.
    ///
    /// Returns `None` when the logs are archived but no archive directory is
    /// known.
    pub fn file_path(&self) -> Option<PathBuf> {
        let (base, ext) = split_extension(&self.config.default_filename);
        let date = self.params.date;

        if date.is_none() && self.params.level.is_none() {
            return Some(
                self.config
                    .default_path
                    .join(make_file_name(&base, &ext, None, None)),
            );
        }

        let name = make_file_name(&base, &ext, self.level_box(), date);
        if !self.logs_archived() {
            return Some(self.config.default_path.join(name));
        }

        self.archive_dir
            .map(|dir| dir.join(format!("{name}{}", constants::ARCHIVE_WILDCARD)))
    }

    /// Resolve the files to scan.
    pub fn resolve(&self) -> Resolution {
        if self.is_remote() {
            return Resolution::Remote(self.remote_listing());
        }

        let files = match self.params.filename.as_deref() {
            Some(filename) => expand_globs(filename),
            None => match self.file_path() {
                Some(path) => expand_globs(&path.to_string_lossy()),
                None => {
                    tracing::warn!(
                        date = ?self.params.date,
                        "Logs are archived but no archive path is configured"
                    );
                    Vec::new()
                }
            },
        };

        tracing::debug!(files = files.len(), "Local file resolution complete");
        Resolution::Local(files)
    }

    fn remote_listing(&self) -> RemoteListing {
        let level = self.params.level.clone().unwrap_or_default();
        let host = self
            .level_box()
            .map(str::to_string)
            .unwrap_or_else(|| level.clone());
        let (_, ext) = split_extension(&self.config.default_filename);
        let name_pattern = make_file_name(
            &self.config.filename_regex,
            &ext,
            Some(level.as_str()),
            self.params.date,
        );
        RemoteListing {
            host,
            level,
            dir: self.config.default_path.clone(),
            name_pattern,
        }
    }

    /// Human-readable description of where files were looked for.
    pub fn location_description(&self) -> String {
        if let Some(filename) = self.params.filename.as_deref() {
            if !self.is_remote() {
                return filename.to_string();
            }
        }
        let path = self
            .file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<no archive path>".to_string());
        let host = match self.params.level.as_deref() {
            None => "the current box".to_string(),
            Some(level) => self.level_box().unwrap_or(level).to_string(),
        };
        format!("{path} on {host}")
    }
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Whether logs for `date` have been archived.
///
/// Always false when archival is disabled (`threshold_days == 0`) or no date
/// is given. A log exactly `threshold_days` old is still live.
pub fn are_logs_archived(threshold_days: u32, date: Option<NaiveDate>, today: NaiveDate) -> bool {
    let Some(date) = date else {
        return false;
    };
    if threshold_days == 0 {
        return false;
    }
    (today - date).num_days() > i64::from(threshold_days)
}

/// Split a filename into its base name and extension (including the dot).
///
/// `"log*.log"` -> `("log*", ".log")`, `"app.log.gz"` -> `("app.log", ".gz")`.
/// Leading-dot names have no extension.
pub fn split_extension(filename: &str) -> (String, String) {
    let path = Path::new(filename);
    match path.extension() {
        Some(ext) => {
            let ext = format!(".{}", ext.to_string_lossy());
            let base = &filename[..filename.len() - ext.len()];
            (base.to_string(), ext)
        }
        None => (filename.to_string(), String::new()),
    }
}

/// Compose `<base>[-<box>][-<date>]<ext>`.
pub fn make_file_name(base: &str, ext: &str, host: Option<&str>, date: Option<NaiveDate>) -> String {
    let mut parts: Vec<String> = vec![base.to_string()];
    if let Some(host) = host {
        parts.push(host.to_string());
    }
    if let Some(date) = date {
        parts.push(date.format(constants::DATE_FORMAT).to_string());
    }
    format!("{}{ext}", parts.join(constants::FILE_NAME_SEPARATOR))
}

/// Expand comma-separated glob patterns into existing regular files, sorted
/// and deduplicated. Patterns that fail to compile are logged and skipped.
pub fn expand_globs(patterns: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();

    for pattern in patterns
        .split(constants::FILENAME_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        match glob::glob(pattern) {
            Ok(paths) => {
                for entry in paths {
                    match entry {
                        Ok(path) => files.push(path),
                        Err(e) => {
                            tracing::debug!(pattern, error = %e, "Unreadable glob entry, skipping");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(pattern, error = %e, "Invalid glob pattern, skipping");
            }
        }
    }

    files.retain(|p| p.is_file());
    files.sort();
    files.dedup();
    files
}
