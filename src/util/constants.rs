// LogScraper - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogScraper";

/// Application identifier used for the platform cache directory.
pub const APP_ID: &str = "LogScraper";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// File resolution
// =============================================================================

/// Separator placed between the base name, box and date when composing a
/// log file name (`<base>-<box>-<date><ext>`).
pub const FILE_NAME_SEPARATOR: &str = "-";

/// Separator between entries of an explicit filename override.
pub const FILENAME_LIST_SEPARATOR: char = ',';

/// Wildcard appended to archived file names; archived copies may carry a
/// suffix (e.g. `.gz`) that the live file does not.
pub const ARCHIVE_WILDCARD: &str = "*";

/// Date format of the `date` user parameter and of the date component of
/// composed file names.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Separator between the level and the remote file name of a local copy
/// (`<level>_<remote name>`).
pub const LOCAL_COPY_SEPARATOR: &str = "_";

/// Suffix of a local copy while it is still being transferred.
pub const PARTIAL_COPY_SUFFIX: &str = ".part";

/// Subdirectory of the platform cache directory used for remote copies when
/// no `tmp_path` is configured.
pub const REMOTE_CACHE_DIR_NAME: &str = "remote";

// =============================================================================
// Defaults (all optional parameters)
// =============================================================================

/// Archival disabled by default.
pub const DEFAULT_DAYS_BEFORE_ARCHIVING: u32 = 0;

/// Remote copies are always refreshed by default.
pub const DEFAULT_LOCAL_COPY_LIFETIME_HOURS: u64 = 0;

/// Default worker pool size for per-file processing.
pub const DEFAULT_PROCESSOR_COUNT: usize = 4;

/// Hard upper bound on the worker pool size (prevents configuration mistakes).
pub const MAX_PROCESSOR_COUNT: usize = 256;

/// Upper bound on the archival threshold (roughly a century).
pub const MAX_DAYS_BEFORE_ARCHIVING: u32 = 36_500;

// =============================================================================
// Remote transport
// =============================================================================

/// Hard timeout on establishing a remote session.
pub const REMOTE_CONNECT_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Pattern limits
// =============================================================================

/// Maximum regex pattern length to prevent pathological compiles.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

// =============================================================================
// Line reading
// =============================================================================

/// Gzip magic number; files starting with these two bytes are decompressed.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Buffer size used for the per-file line reader.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Maximum length of a log line included in diagnostic output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;
