// LogScraper - core/mod.rs
//
// Core business logic layer: matching, file resolution policy, per-file
// scraping, aggregation and stats.
// Must NOT depend on: platform or app.

pub mod aggregate;
pub mod locator;
pub mod matcher;
pub mod model;
pub mod process;
pub mod stats;
