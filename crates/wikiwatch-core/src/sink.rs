//! The `RecordSink` trait: where matched events and alerts are persisted.

use crate::error::SinkError;
use crate::types::{AlertRecord, MatchedEvent};

/// Destination of the two output logs.
///
/// Writes are synchronous: an `Ok` return means the row is durable (or, for
/// in-memory implementations, recorded). The session calls `append_event`
/// for every matched event before `append_alert` for the same event, so the
/// alert log is always a subset of the event log.
pub trait RecordSink: Send {
    /// Append one row to the event log.
    fn append_event(&mut self, event: &MatchedEvent) -> Result<(), SinkError>;

    /// Append one row to the alert log.
    fn append_alert(&mut self, alert: &AlertRecord) -> Result<(), SinkError>;
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn append_event(&mut self, event: &MatchedEvent) -> Result<(), SinkError> {
        (**self).append_event(event)
    }

    fn append_alert(&mut self, alert: &AlertRecord) -> Result<(), SinkError> {
        (**self).append_alert(alert)
    }
}
