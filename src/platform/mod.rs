// LogScraper - platform/mod.rs
//
// Platform abstraction layer: config file loading, file handles (plain or
// gzip), host name lookup, remote transport.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
pub mod host;
pub mod remote;
