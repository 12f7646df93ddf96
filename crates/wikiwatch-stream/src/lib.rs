//! # wikiwatch-stream
//!
//! Follows a server-sent-event change feed and drives the WikiWatch pipeline
//! over every line it receives.
//!
//! ## Architecture
//! ```text
//! FeedSource::connect (HttpFeed → reqwest body stream)
//!       │
//!       ▼
//! frame_lines (bytes → lines, CR / LF / CRLF)
//!       │
//!       ▼
//! StreamSession::process_line
//!       ├── decode_line        (skip blank / framing / malformed)
//!       ├── MatchedEvent::classify (target wiki + watch-list)
//!       ├── RecordSink::append_event
//!       └── AlertRuleSet::evaluate → RecordSink::append_alert + warn!
//! ```
//!
//! The session ends on the shutdown future (clean stop) or on the first
//! transport or sink failure. It never reconnects.

pub mod framing;
pub mod http;
pub mod session;
pub mod source;

pub use framing::{frame_lines, LineFramer, MAX_LINE_BYTES};
pub use http::{HttpFeed, HttpFeedConfig};
pub use session::{LineOutcome, SessionMetrics, SessionReport, SessionState, StreamSession};
pub use source::{FeedSource, LineStream};
