// LogScraper - app/mod.rs
//
// Application layer: scrape orchestration, customisation hooks, report
// rendering.
// Dependencies: core and platform layers.

pub mod hooks;
pub mod report;
pub mod scraper;
