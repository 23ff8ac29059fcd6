//! dstar-observability – structured logging for the toolkit's binaries
//!
//! No metrics or health-check surface: these binaries are one-shot CLI
//! tools, not long-running services, so there is nothing to scrape.

pub mod logging;

pub use logging::init;
