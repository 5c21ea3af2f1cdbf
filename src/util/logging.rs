// LogScraper - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr, so stdout stays clean for reports and matched lines.

use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from the config file (if present).
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
///
/// Only the first call installs a subscriber; later calls are no-ops, so
/// library users and tests can call this freely.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .compact()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            app = super::constants::APP_NAME,
            version = super::constants::APP_VERSION,
            "Logging initialised"
        );
    }
}
