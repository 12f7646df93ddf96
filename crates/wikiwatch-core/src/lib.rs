//! wikiwatch-core: domain types and pure pipeline stages for WikiWatch.
//!
//! # Overview
//!
//! WikiWatch follows the Wikimedia `recentchange` server-sent-event feed,
//! keeps the changes that touch a watch-list of pages, logs them, and raises
//! alerts on selected ones. This crate holds everything that does no I/O:
//!
//! - [`decoder`]: feed line → [`ChangeEvent`]
//! - [`matcher`]: title → canonical watch-list entry
//! - [`alert`]: matched event → alert reasons
//! - [`types`]: records and their log rows
//! - [`sink`]: the [`RecordSink`] trait implemented by `wikiwatch-sink`
//! - [`config`] / [`error`]

pub mod alert;
pub mod config;
pub mod decoder;
pub mod error;
pub mod matcher;
pub mod sink;
pub mod types;

pub use alert::{AlertRule, AlertRuleSet};
pub use config::{LogConfig, OutputPaths, WatchConfig};
pub use decoder::{decode, decode_line, DecodeOutcome};
pub use error::{ConfigError, SessionError, SinkError, StreamError};
pub use matcher::{match_entity, Watchlist};
pub use sink::RecordSink;
pub use types::{AlertRecord, ChangeEvent, MatchedEvent, ALERT_COLUMNS, EVENT_COLUMNS};
