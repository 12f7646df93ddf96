//! Sink that reports rows through `tracing` and keeps nothing.
//!
//! Backs `wikiwatch run --dry-run`. A dry run follows the feed for as long as
//! the operator lets it, so nothing may accumulate per row: each row is
//! logged at `info` and dropped. Only the two counters survive.

use tracing::info;

use wikiwatch_core::error::SinkError;
use wikiwatch_core::sink::RecordSink;
use wikiwatch_core::types::{AlertRecord, MatchedEvent};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogOnlySink {
    events: u64,
    alerts: u64,
}

impl LogOnlySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event-log rows that would have been written.
    pub fn events_seen(&self) -> u64 {
        self.events
    }

    /// Alert-log rows that would have been written.
    pub fn alerts_seen(&self) -> u64 {
        self.alerts
    }
}

impl RecordSink for LogOnlySink {
    fn append_event(&mut self, event: &MatchedEvent) -> Result<(), SinkError> {
        self.events += 1;
        info!(row = %event.row().join(","), "dry run: event row");
        Ok(())
    }

    fn append_alert(&mut self, alert: &AlertRecord) -> Result<(), SinkError> {
        self.alerts += 1;
        info!(row = %alert.row().join(","), "dry run: alert row");
        Ok(())
    }
}
