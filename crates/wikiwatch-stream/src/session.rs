//! `StreamSession`: one connection to the feed, consumed line by line.

use futures::StreamExt;
use std::future::Future;
use tracing::{debug, error, info, trace, warn};

use wikiwatch_core::alert::AlertRuleSet;
use wikiwatch_core::config::WatchConfig;
use wikiwatch_core::decoder::{decode_line, DecodeOutcome};
use wikiwatch_core::error::{SessionError, SinkError, StreamError};
use wikiwatch_core::matcher::Watchlist;
use wikiwatch_core::sink::RecordSink;
use wikiwatch_core::types::{AlertRecord, MatchedEvent};

use crate::source::FeedSource;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet connected.
    Disconnected,
    /// Reading lines from the feed.
    Connected,
    /// Stopped on request. Terminal.
    Stopped,
    /// Ended by a transport or sink failure. Terminal.
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
            Self::Stopped => write!(f, "stopped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Counters for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMetrics {
    pub lines_read: u64,
    pub blank_lines: u64,
    pub framing_lines: u64,
    pub malformed_lines: u64,
    pub events_decoded: u64,
    pub events_matched: u64,
    pub alerts_raised: u64,
}

/// What happened to a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Not an event (blank, framing or undecodable).
    Skipped,
    /// An event, but not for a tracked page on the target wiki.
    Ignored,
    /// Written to the event log only.
    Logged,
    /// Written to both logs.
    Alerted,
}

/// Returned when a session stops cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub state: SessionState,
    pub metrics: SessionMetrics,
}

/// Drives decode → match → log → alert over one feed connection.
pub struct StreamSession<F, S> {
    feed: F,
    sink: S,
    target_wiki: String,
    watchlist: Watchlist,
    rules: AlertRuleSet,
    state: SessionState,
    metrics: SessionMetrics,
}

impl<F: FeedSource, S: RecordSink> StreamSession<F, S> {
    /// Build a session from `config`. The sink must already be initialised.
    pub fn new(config: &WatchConfig, feed: F, sink: S) -> Self {
        Self {
            feed,
            sink,
            target_wiki: config.target_wiki.clone(),
            watchlist: config.watchlist(),
            rules: config.alert_rules(),
            state: SessionState::Disconnected,
            metrics: SessionMetrics::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Connect and process lines until `shutdown` resolves or the feed fails.
    ///
    /// `shutdown` is checked before every line and while waiting for one, so
    /// a stop request never interrupts a row being written. Returns
    /// `Ok(report)` with [`SessionState::Stopped`] on a requested stop; any
    /// transport or sink failure, including the server closing the stream,
    /// leaves the session [`SessionState::Failed`] and is returned as `Err`.
    pub async fn run<Sd>(&mut self, shutdown: Sd) -> Result<SessionReport, SessionError>
    where
        Sd: Future<Output = ()>,
    {
        if self.state.is_terminal() {
            return Err(SessionError::Finished {
                state: self.state.to_string(),
            });
        }
        tokio::pin!(shutdown);

        info!(url = %self.feed.endpoint(), "connecting to change feed");
        let mut lines = tokio::select! {
            biased;
            _ = &mut shutdown => return Ok(self.stop()),
            conn = self.feed.connect() => match conn {
                Ok(lines) => lines,
                Err(e) => return Err(self.fail(e.into())),
            },
        };
        self.transition(SessionState::Connected);
        info!(
            url = %self.feed.endpoint(),
            wiki = %self.target_wiki,
            tracked = self.watchlist.len(),
            "connected to change feed"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    drop(lines);
                    return Ok(self.stop());
                }
                next = lines.next() => match next {
                    Some(Ok(line)) => {
                        if let Err(e) = self.process_line(&line) {
                            return Err(self.fail(e.into()));
                        }
                    }
                    Some(Err(e)) => return Err(self.fail(e.into())),
                    None => return Err(self.fail(StreamError::Closed.into())),
                },
            }
        }
    }

    /// Run one raw line through the pipeline.
    pub fn process_line(&mut self, line: &[u8]) -> Result<LineOutcome, SinkError> {
        self.metrics.lines_read += 1;

        let event = match decode_line(line) {
            DecodeOutcome::Event(event) => event,
            DecodeOutcome::Blank => {
                self.metrics.blank_lines += 1;
                return Ok(LineOutcome::Skipped);
            }
            DecodeOutcome::Framing => {
                self.metrics.framing_lines += 1;
                trace!("framing line skipped");
                return Ok(LineOutcome::Skipped);
            }
            DecodeOutcome::Malformed => {
                self.metrics.malformed_lines += 1;
                debug!(
                    line = %String::from_utf8_lossy(&line[..line.len().min(120)]),
                    "undecodable data line skipped"
                );
                return Ok(LineOutcome::Skipped);
            }
        };
        self.metrics.events_decoded += 1;

        let Some(matched) = MatchedEvent::classify(event, &self.target_wiki, &self.watchlist) else {
            return Ok(LineOutcome::Ignored);
        };
        self.metrics.events_matched += 1;
        self.sink.append_event(&matched)?;
        debug!(
            entity = matched.entity_match(),
            title = matched.title(),
            size_diff = matched.size_delta(),
            "tracked page changed"
        );

        let reasons = self.rules.evaluate(&matched);
        let Some(alert) = AlertRecord::new(matched, &reasons) else {
            return Ok(LineOutcome::Logged);
        };
        self.sink.append_alert(&alert)?;
        self.metrics.alerts_raised += 1;

        let m = alert.matched();
        warn!(
            timestamp = m.timestamp(),
            title = m.title(),
            entity = m.entity_match(),
            reason = alert.reason(),
            "[ALERT] {} — {} — {}",
            m.timestamp(),
            m.title(),
            alert.reason()
        );
        Ok(LineOutcome::Alerted)
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "session state change");
        self.state = next;
    }

    fn stop(&mut self) -> SessionReport {
        self.transition(SessionState::Stopped);
        let m = &self.metrics;
        info!(
            lines = m.lines_read,
            decoded = m.events_decoded,
            matched = m.events_matched,
            alerts = m.alerts_raised,
            "stream session stopped"
        );
        SessionReport {
            state: self.state,
            metrics: self.metrics.clone(),
        }
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        self.transition(SessionState::Failed);
        error!(
            error = %err,
            lines = self.metrics.lines_read,
            matched = self.metrics.events_matched,
            "stream session failed"
        );
        err
    }
}
