// LogScraper - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Recoverable conditions (no files, remote failures) are surfaced as values so
// the orchestrator can log them and degrade to an empty result.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogScraper operations.
#[derive(Debug)]
pub enum ScraperError {
    /// A regex could not be added or updated.
    Pattern(PatternError),

    /// Configuration loading failed.
    Config(ConfigError),

    /// A remote session or copy failed.
    Remote(RemoteError),

    /// User parameters were rejected during validation.
    InvalidArgument { message: String },

    /// File resolution produced nothing to scan.
    NoFilesFound { location: String },
}

impl fmt::Display for ScraperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(e) => write!(f, "Pattern error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Remote(e) => write!(f, "Remote error: {e}"),
            Self::InvalidArgument { message } => write!(f, "Invalid argument: {message}"),
            Self::NoFilesFound { location } => write!(
                f,
                "No files found at {location}. Please provide a valid path to a log file."
            ),
        }
    }
}

impl std::error::Error for ScraperError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Remote(e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern errors
// ---------------------------------------------------------------------------

/// Errors raised when constructing or updating a matcher.
#[derive(Debug)]
pub enum PatternError {
    /// The pattern does not compile.
    InvalidRegex {
        name: String,
        pattern: String,
        source: regex::Error,
    },

    /// The pattern exceeds the maximum allowed length.
    RegexTooLong {
        name: String,
        length: usize,
        max_length: usize,
    },

    /// A matcher with this name is already configured.
    DuplicateName { name: String },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex {
                name,
                pattern,
                source,
            } => write!(
                f,
                "Invalid pattern for regex '{name}' ('{pattern}'). Could not create matcher: {source}"
            ),
            Self::RegexTooLong {
                name,
                length,
                max_length,
            } => write!(
                f,
                "Pattern for regex '{name}' is {length} chars, exceeds maximum of {max_length}"
            ),
            Self::DuplicateName { name } => {
                write!(f, "A regex named '{name}' is already configured")
            }
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PatternError> for ScraperError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}

// ---------------------------------------------------------------------------
// Remote errors
// ---------------------------------------------------------------------------

/// Failure categories for remote sessions and copies.
#[derive(Debug)]
pub enum RemoteError {
    /// The host could not be resolved or reached.
    Unreachable { host: String, source: io::Error },

    /// The host key could not be verified.
    HostKeyVerification { host: String, reason: String },

    /// Authentication was rejected.
    Authentication { host: String, reason: String },

    /// Session-level failure after connecting (listing, transfer, protocol).
    Session { host: String, reason: String },

    /// No transport is configured for remote access.
    Unsupported { host: String },

    /// Local I/O failure while storing a copied file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable { host, source } => {
                write!(f, "Could not create connection on server {host}: {source}")
            }
            Self::HostKeyVerification { host, reason } => {
                write!(f, "Could not verify hostkey for server {host}: {reason}")
            }
            Self::Authentication { host, reason } => {
                write!(f, "Could not authenticate on server {host}: {reason}")
            }
            Self::Session { host, reason } => {
                write!(f, "Session error on server {host}: {reason}")
            }
            Self::Unsupported { host } => write!(
                f,
                "No remote transport configured; cannot reach server {host}"
            ),
            Self::Io { path, source } => {
                write!(f, "I/O error on local copy '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreachable { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RemoteError> for ScraperError {
    fn from(e: RemoteError) -> Self {
        Self::Remote(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ScraperError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogScraper results.
pub type Result<T> = std::result::Result<T, ScraperError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_pattern_error_keeps_regex_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ScraperError::from(PatternError::InvalidRegex {
            name: "bad".to_string(),
            pattern: "(".to_string(),
            source,
        });
        let pattern_err = err.source().expect("pattern error is the source");
        assert!(pattern_err.source().is_some(), "regex error should be chained");
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_no_files_found_message_names_location() {
        let err = ScraperError::NoFilesFound {
            location: "/var/log/app-*.log on the current box".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/var/log/app-*.log"));
        assert!(err.source().is_none());
    }
}
