// LogScraper - app/hooks.rs
//
// Customisation points of a scraper. A deployment supplies its own regexes,
// archive location and parameter validation by implementing `ScraperHooks`;
// every method has a default so implementors override only what they need.

use crate::core::matcher::PatternMatcher;
use crate::core::model::{ScraperConfig, UserParams};
use crate::platform::config::RegexDef;
use crate::util::error::{PatternError, ScraperError};
use std::path::PathBuf;

/// Extension points consulted by `LogScraper`.
pub trait ScraperHooks: Send + Sync {
    /// Matchers installed when the scraper is constructed.
    fn init_regexes(&self) -> Result<Vec<PatternMatcher>, PatternError> {
        Ok(Vec::new())
    }

    /// Directory holding archived logs. Consulted on every resolution.
    fn archived_file_path(&self, config: &ScraperConfig) -> Option<PathBuf> {
        config.archive_path.clone()
    }

    /// Extra checks on user parameters, run after the built-in ones.
    fn validate_user_params(&self, _params: &UserParams) -> Result<(), ScraperError> {
        Ok(())
    }
}

/// No regexes, archive path from the config, no extra validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl ScraperHooks for DefaultHooks {}

/// Hooks driven by the `[[regex]]` entries of a config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigHooks {
    regexes: Vec<RegexDef>,
}

impl ConfigHooks {
    pub fn new(regexes: Vec<RegexDef>) -> Self {
        Self { regexes }
    }
}

impl ScraperHooks for ConfigHooks {
    fn init_regexes(&self) -> Result<Vec<PatternMatcher>, PatternError> {
        self.regexes
            .iter()
            .map(|def| PatternMatcher::new(def.name.as_str(), def.pattern.as_str()))
            .collect()
    }
}
