//! Records flowing through the pipeline and their projection into log rows.

use chrono::DateTime;

use crate::matcher::Watchlist;

// ─── Columns ──────────────────────────────────────────────────────────────────

/// Header of the event log.
pub const EVENT_COLUMNS: [&str; 10] = [
    "timestamp",
    "wiki",
    "title",
    "entity_match",
    "user",
    "type",
    "comment",
    "old_len",
    "new_len",
    "size_diff",
];

/// Header of the alert log: the event columns with `reason` before the sizes.
pub const ALERT_COLUMNS: [&str; 11] = [
    "timestamp",
    "wiki",
    "title",
    "entity_match",
    "user",
    "type",
    "comment",
    "reason",
    "old_len",
    "new_len",
    "size_diff",
];

/// Separator between the descriptions of several fired rules.
pub const REASON_SEPARATOR: &str = " ; ";

// ─── ChangeEvent ──────────────────────────────────────────────────────────────

/// One decoded `recentchange` notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Source wiki database name (e.g. `"enwiki"`). Empty when absent.
    pub wiki: String,
    pub title: Option<String>,
    /// Unix timestamp of the change (seconds since epoch).
    pub timestamp: Option<i64>,
    pub user: Option<String>,
    /// The feed's `type` field (`edit`, `new`, `log`, ...).
    pub kind: Option<String>,
    pub comment: String,
    /// Page length before the change, in bytes.
    pub old_length: u64,
    /// Page length after the change, in bytes.
    pub new_length: u64,
}

impl ChangeEvent {
    /// `new_length - old_length`.
    pub fn size_delta(&self) -> i64 {
        let delta = i128::from(self.new_length) - i128::from(self.old_length);
        delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    /// Timestamp rendered for the logs. See [`format_timestamp`].
    pub fn formatted_timestamp(&self) -> String {
        format_timestamp(self.timestamp)
    }
}

/// Render epoch seconds as `YYYY-MM-DDTHH:MM:SS` in UTC, without offset.
///
/// An absent or zero timestamp yields an empty string, as does one outside
/// the representable range.
pub fn format_timestamp(timestamp: Option<i64>) -> String {
    match timestamp {
        Some(secs) if secs != 0 => DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

// ─── MatchedEvent ─────────────────────────────────────────────────────────────

/// A change to a tracked page on the target wiki.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedEvent {
    event: ChangeEvent,
    entity_match: String,
    timestamp: String,
}

impl MatchedEvent {
    /// Keep `event` only if it comes from `target_wiki` and its title is on
    /// the watch-list.
    pub fn classify(event: ChangeEvent, target_wiki: &str, watchlist: &Watchlist) -> Option<Self> {
        if event.wiki != target_wiki {
            return None;
        }
        let entity_match = watchlist.resolve(event.title.as_deref())?.to_string();
        let timestamp = event.formatted_timestamp();
        Some(Self {
            event,
            entity_match,
            timestamp,
        })
    }

    pub fn event(&self) -> &ChangeEvent {
        &self.event
    }

    /// Canonical watch-list name the title matched.
    pub fn entity_match(&self) -> &str {
        &self.entity_match
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn title(&self) -> &str {
        self.event.title.as_deref().unwrap_or_default()
    }

    pub fn size_delta(&self) -> i64 {
        self.event.size_delta()
    }

    /// The row for the event log, in [`EVENT_COLUMNS`] order.
    pub fn row(&self) -> Vec<String> {
        let mut row = self.leading_cells();
        row.extend(self.size_cells());
        row
    }

    fn leading_cells(&self) -> Vec<String> {
        let e = &self.event;
        vec![
            self.timestamp.clone(),
            e.wiki.clone(),
            self.title().to_string(),
            self.entity_match.clone(),
            e.user.clone().unwrap_or_default(),
            e.kind.clone().unwrap_or_default(),
            e.comment.clone(),
        ]
    }

    fn size_cells(&self) -> [String; 3] {
        [
            self.event.old_length.to_string(),
            self.event.new_length.to_string(),
            self.size_delta().to_string(),
        ]
    }
}

// ─── AlertRecord ──────────────────────────────────────────────────────────────

/// A matched event for which at least one alert rule fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecord {
    matched: MatchedEvent,
    reason: String,
}

impl AlertRecord {
    /// Returns `None` when `reasons` is empty: no rule fired, no alert.
    pub fn new(matched: MatchedEvent, reasons: &[String]) -> Option<Self> {
        if reasons.is_empty() {
            return None;
        }
        Some(Self {
            matched,
            reason: reasons.join(REASON_SEPARATOR),
        })
    }

    pub fn matched(&self) -> &MatchedEvent {
        &self.matched
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The row for the alert log, in [`ALERT_COLUMNS`] order.
    pub fn row(&self) -> Vec<String> {
        let mut row = self.matched.leading_cells();
        row.push(self.reason.clone());
        row.extend(self.matched.size_cells());
        row
    }
}
