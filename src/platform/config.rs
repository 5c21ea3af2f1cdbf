// LogScraper - platform/config.rs
//
// config.toml loading with startup validation.
//
// The file is deserialised into a raw, all-optional shape first, then every
// field is checked against the named limits in `util::constants`. Invalid
// values produce actionable warnings and fall back to defaults; only an
// unreadable or unparseable file is an error.

use crate::core::model::ScraperConfig;
use crate::platform::remote;
use crate::util::constants;
use crate::util::error::ConfigError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[files]` section.
    pub files: FilesSection,
    /// `[remote]` section.
    pub remote: RemoteSection,
    /// `[processing]` section.
    pub processing: ProcessingSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
    /// `[[regex]]` entries.
    pub regex: Vec<RegexSection>,
}

/// `[files]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FilesSection {
    pub default_path: Option<String>,
    pub default_filename: Option<String>,
    pub days_before_archiving: Option<i64>,
    pub archive_path: Option<String>,
}

/// `[remote]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RemoteSection {
    pub filename_regex: Option<String>,
    pub force_copy: Option<bool>,
    pub local_copy_lifetime_hours: Option<i64>,
    /// Empty or absent = platform cache directory.
    pub tmp_path: Option<String>,
    pub levels_to_boxes: BTreeMap<String, String>,
}

/// `[processing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ProcessingSection {
    pub processor_count: Option<i64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// One `[[regex]]` entry.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RegexSection {
    pub name: String,
    pub pattern: String,
}

/// A named regex definition from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexDef {
    pub name: String,
    pub pattern: String,
}

/// Validated result of loading a config file.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub scraper: ScraperConfig,
    pub regexes: Vec<RegexDef>,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Non-fatal validation problems, in file order.
    pub warnings: Vec<String>,
}

/// Load and validate the config file at `path`.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let loaded = parse_config(&content, path)?;
    tracing::info!(path = %path.display(), regexes = loaded.regexes.len(), "Loaded config");
    Ok(loaded)
}

/// Parse and validate config file content. `path` is only used in messages.
pub fn parse_config(content: &str, path: &Path) -> Result<LoadedConfig, ConfigError> {
    let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut warnings: Vec<String> = Vec::new();
    let mut config = ScraperConfig::default();

    // -- Files --
    if let Some(p) = raw.files.default_path {
        config.default_path = PathBuf::from(p);
    }
    if let Some(name) = raw.files.default_filename {
        config.default_filename = name;
    }
    if let Some(days) = raw.files.days_before_archiving {
        match u32::try_from(days) {
            Ok(d) if d <= constants::MAX_DAYS_BEFORE_ARCHIVING => {
                config.days_before_archiving = d
            }
            _ => warnings.push(out_of_range(
                "files.days_before_archiving",
                days,
                format!(
                    "0-{}; using default ({})",
                    constants::MAX_DAYS_BEFORE_ARCHIVING,
                    constants::DEFAULT_DAYS_BEFORE_ARCHIVING
                ),
            )),
        }
    }
    config.archive_path = non_empty_path(raw.files.archive_path);

    // -- Remote --
    if let Some(re) = raw.remote.filename_regex {
        config.filename_regex = re;
    }
    if let Some(force) = raw.remote.force_copy {
        config.force_copy = force;
    }
    if let Some(hours) = raw.remote.local_copy_lifetime_hours {
        match u64::try_from(hours) {
            Ok(h) => config.local_copy_lifetime_hours = h,
            Err(_) => warnings.push(out_of_range(
                "remote.local_copy_lifetime_hours",
                hours,
                format!(
                    "a non-negative number of hours; using default ({})",
                    constants::DEFAULT_LOCAL_COPY_LIFETIME_HOURS
                ),
            )),
        }
    }
    config.tmp_path = non_empty_path(raw.remote.tmp_path);
    config.levels_to_boxes = raw.remote.levels_to_boxes;

    // -- Processing --
    if let Some(count) = raw.processing.processor_count {
        match usize::try_from(count) {
            Ok(c) if (1..=constants::MAX_PROCESSOR_COUNT).contains(&c) => {
                config.processor_count = c
            }
            _ => warnings.push(out_of_range(
                "processing.processor_count",
                count,
                format!(
                    "1-{}; using default ({})",
                    constants::MAX_PROCESSOR_COUNT,
                    constants::DEFAULT_PROCESSOR_COUNT
                ),
            )),
        }
    }

    // -- Logging --
    let mut log_level = None;
    if let Some(level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            log_level = Some(level);
        } else {
            warnings.push(out_of_range(
                "logging.level",
                &level,
                format!(
                    "one of {}; using default ({})",
                    constants::VALID_LOG_LEVELS.join(", "),
                    constants::DEFAULT_LOG_LEVEL
                ),
            ));
        }
    }

    // -- Regexes --
    let mut regexes = Vec::with_capacity(raw.regex.len());
    for (idx, entry) in raw.regex.into_iter().enumerate() {
        if entry.name.is_empty() || entry.pattern.is_empty() {
            warnings.push(format!(
                "[[regex]] entry {} needs both 'name' and 'pattern'; skipping it.",
                idx + 1
            ));
            continue;
        }
        regexes.push(RegexDef {
            name: entry.name,
            pattern: entry.pattern,
        });
    }

    if !warnings.is_empty() {
        tracing::warn!(
            path = %path.display(),
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    Ok(LoadedConfig {
        scraper: config,
        regexes,
        log_level,
        warnings,
    })
}

/// Directory remote files are copied to: the configured `tmp_path`, or the
/// platform cache directory.
pub fn resolve_tmp_path(config: &ScraperConfig) -> PathBuf {
    config
        .tmp_path
        .clone()
        .unwrap_or_else(remote::default_copy_dir)
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> String {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
    .to_string()
}

fn non_empty_path(value: Option<String>) -> Option<PathBuf> {
    value.filter(|s| !s.trim().is_empty()).map(PathBuf::from)
}
