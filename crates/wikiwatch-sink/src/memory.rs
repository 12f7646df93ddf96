//! In-memory sink.
//!
//! Keeps the rows that would have been written to the two logs. Useful for
//! tests; all data is lost when the process exits. Every row is retained, so
//! it is not meant for an open-ended session.

use wikiwatch_core::error::SinkError;
use wikiwatch_core::sink::RecordSink;
use wikiwatch_core::types::{AlertRecord, MatchedEvent};

#[derive(Debug, Default, Clone)]
pub struct InMemorySink {
    events: Vec<Vec<String>>,
    alerts: Vec<Vec<String>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event-log rows, in [`EVENT_COLUMNS`](wikiwatch_core::EVENT_COLUMNS) order.
    pub fn events(&self) -> &[Vec<String>] {
        &self.events
    }

    /// Alert-log rows, in [`ALERT_COLUMNS`](wikiwatch_core::ALERT_COLUMNS) order.
    pub fn alerts(&self) -> &[Vec<String>] {
        &self.alerts
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.alerts.clear();
    }
}

impl RecordSink for InMemorySink {
    fn append_event(&mut self, event: &MatchedEvent) -> Result<(), SinkError> {
        self.events.push(event.row());
        Ok(())
    }

    fn append_alert(&mut self, alert: &AlertRecord) -> Result<(), SinkError> {
        self.alerts.push(alert.row());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikiwatch_core::{ChangeEvent, Watchlist};

    #[test]
    fn records_rows_in_arrival_order() {
        let w = Watchlist::new(["A", "B"]);
        let mut sink = InMemorySink::new();
        for title in ["b", "a"] {
            let e = ChangeEvent {
                wiki: "enwiki".into(),
                title: Some(title.into()),
                ..Default::default()
            };
            let m = MatchedEvent::classify(e, "enwiki", &w).unwrap();
            sink.append_event(&m).unwrap();
            if title == "a" {
                let alert = AlertRecord::new(m, &["why".to_string()]).unwrap();
                sink.append_alert(&alert).unwrap();
            }
        }
        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.events()[0][3], "B");
        assert_eq!(sink.events()[1][3], "A");
        assert_eq!(sink.alerts().len(), 1);
        assert_eq!(sink.alerts()[0][7], "why");

        sink.clear();
        assert!(sink.events().is_empty() && sink.alerts().is_empty());
    }
}
