//! Tolerant decoding of feed lines into [`ChangeEvent`]s.
//!
//! Only `data: <json-object>` lines carry events. Every other line shape
//! (blank keep-alives, `event:` / `id:` / `retry:` fields, `:` comments) and
//! every payload that is not a JSON object is reported as a non-event
//! outcome. Nothing here returns an error: a bad line must never end a
//! session.

use serde_json::{Map, Value};

use crate::types::ChangeEvent;

/// Marker that prefixes a payload line.
pub const DATA_PREFIX: &[u8] = b"data: ";

/// What a single feed line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Empty or whitespace-only line (event terminator / keep-alive).
    Blank,
    /// Any non-`data: ` line.
    Framing,
    /// A `data: ` line whose payload is not a JSON object.
    Malformed,
    Event(ChangeEvent),
}

impl DecodeOutcome {
    pub fn into_event(self) -> Option<ChangeEvent> {
        match self {
            Self::Event(event) => Some(event),
            _ => None,
        }
    }
}

/// Classify one line of the feed.
pub fn decode_line(line: &[u8]) -> DecodeOutcome {
    if line.iter().all(u8::is_ascii_whitespace) {
        return DecodeOutcome::Blank;
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return DecodeOutcome::Framing;
    };
    let Ok(value) = serde_json::from_slice::<Value>(payload) else {
        return DecodeOutcome::Malformed;
    };
    match value.as_object() {
        Some(obj) => DecodeOutcome::Event(event_from_object(obj)),
        None => DecodeOutcome::Malformed,
    }
}

/// Decode one line, discarding everything that is not an event.
pub fn decode(line: &[u8]) -> Option<ChangeEvent> {
    decode_line(line).into_event()
}

fn event_from_object(obj: &Map<String, Value>) -> ChangeEvent {
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_owned);
    let (old_length, new_length) = lengths(obj);

    ChangeEvent {
        wiki: text("wiki").unwrap_or_default(),
        title: text("title"),
        timestamp: obj.get("timestamp").and_then(Value::as_i64),
        user: text("user"),
        kind: text("type"),
        comment: text("comment").unwrap_or_default(),
        old_length,
        new_length,
    }
}

/// Page lengths from flat `old_len` / `length` integers, falling back to the
/// `length: {"old": .., "new": ..}` object the live feed sends.
fn lengths(obj: &Map<String, Value>) -> (u64, u64) {
    let length = obj.get("length");
    let nested = |key: &str| {
        length
            .and_then(Value::as_object)
            .and_then(|l| l.get(key))
            .and_then(Value::as_u64)
    };

    let old = obj
        .get("old_len")
        .and_then(Value::as_u64)
        .or_else(|| nested("old"))
        .unwrap_or(0);
    let new = length
        .and_then(Value::as_u64)
        .or_else(|| nested("new"))
        .unwrap_or(0);
    (old, new)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAMA: &str = r#"data: {"wiki":"enwiki","title":"Drama film","timestamp":1700000000,"user":"ExampleUser","type":"edit","comment":"fix","old_len":100,"length":7000}"#;

    #[test]
    fn decodes_all_recognised_fields() {
        let e = decode(DRAMA.as_bytes()).unwrap();
        assert_eq!(e.wiki, "enwiki");
        assert_eq!(e.title.as_deref(), Some("Drama film"));
        assert_eq!(e.timestamp, Some(1_700_000_000));
        assert_eq!(e.user.as_deref(), Some("ExampleUser"));
        assert_eq!(e.kind.as_deref(), Some("edit"));
        assert_eq!(e.comment, "fix");
        assert_eq!((e.old_length, e.new_length), (100, 7000));
        assert_eq!(e.size_delta(), 6900);
    }

    #[test]
    fn non_data_lines_are_framing() {
        for line in [
            "event: message",
            "id: [{\"topic\":\"eventgate-main.mediawiki.recentchange\"}]",
            ": ok",
            "retry: 3000",
            "data:{\"wiki\":\"enwiki\"}",
            "DATA: {}",
        ] {
            assert_eq!(decode_line(line.as_bytes()), DecodeOutcome::Framing, "{line}");
            assert_eq!(decode(line.as_bytes()), None);
            // same answer the second time round
            assert_eq!(decode(line.as_bytes()), None);
        }
    }

    #[test]
    fn blank_lines() {
        assert_eq!(decode_line(b""), DecodeOutcome::Blank);
        assert_eq!(decode_line(b"  \t"), DecodeOutcome::Blank);
    }

    #[test]
    fn bad_payloads_are_malformed() {
        for line in [
            "data: {not json",
            "data: ",
            "data: [1,2,3]",
            "data: \"enwiki\"",
            "data: null",
        ] {
            assert_eq!(decode_line(line.as_bytes()), DecodeOutcome::Malformed, "{line}");
        }
        assert_eq!(decode_line(b"data: \xff\xfe"), DecodeOutcome::Malformed);
    }

    #[test]
    fn missing_sizes_default_to_zero() {
        let e = decode(br#"data: {"wiki":"enwiki","length":40}"#).unwrap();
        assert_eq!((e.old_length, e.new_length, e.size_delta()), (0, 40, 40));

        let e = decode(br#"data: {"wiki":"enwiki","old_len":40}"#).unwrap();
        assert_eq!((e.old_length, e.new_length, e.size_delta()), (40, 0, -40));

        let e = decode(br#"data: {"old_len":null,"length":null}"#).unwrap();
        assert_eq!((e.old_length, e.new_length), (0, 0));
        assert_eq!(e.wiki, "");
    }

    #[test]
    fn nested_length_object_is_understood() {
        let e = decode(br#"data: {"wiki":"enwiki","length":{"old":8000,"new":2500}}"#).unwrap();
        assert_eq!((e.old_length, e.new_length, e.size_delta()), (8000, 2500, -5500));

        let e = decode(br#"data: {"length":{"new":12}}"#).unwrap();
        assert_eq!((e.old_length, e.new_length), (0, 12));
    }

    #[test]
    fn wrong_types_count_as_absent() {
        let e = decode(
            br#"data: {"wiki":"enwiki","title":42,"timestamp":"yesterday","user":null,"comment":{},"old_len":-3,"length":1.5}"#,
        )
        .unwrap();
        assert_eq!(e.title, None);
        assert_eq!(e.timestamp, None);
        assert_eq!(e.user, None);
        assert_eq!(e.comment, "");
        assert_eq!((e.old_length, e.new_length), (0, 0));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let e = decode(br#"data: {"wiki":"enwiki","bot":true,"meta":{"id":"x"},"title":"T"}"#).unwrap();
        assert_eq!(e.title.as_deref(), Some("T"));
    }
}
