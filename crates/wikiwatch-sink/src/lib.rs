//! wikiwatch-sink: output sinks for WikiWatch.
//!
//! Backends:
//! - [`csv_log`]: two durable CSV files, truncated at startup (production)
//! - [`log_only`]: rows logged and dropped (`--dry-run`)
//! - [`memory`]: rows kept in RAM (tests)

pub mod csv_log;
pub mod log_only;
pub mod memory;

pub use csv_log::CsvSink;
pub use log_only::LogOnlySink;
pub use memory::InMemorySink;
