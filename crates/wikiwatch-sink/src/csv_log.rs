//! Durable CSV output logs.
//!
//! Both files are truncated and given a header row when the sink is created.
//! Each append writes one complete record, flushes the CSV buffer, and syncs
//! the file before returning, so an abrupt exit loses at most the row being
//! written when it happened.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use wikiwatch_core::config::OutputPaths;
use wikiwatch_core::error::SinkError;
use wikiwatch_core::sink::RecordSink;
use wikiwatch_core::types::{AlertRecord, MatchedEvent, ALERT_COLUMNS, EVENT_COLUMNS};

/// One append-only CSV file with a held handle.
struct LogFile {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl LogFile {
    fn create(path: &Path, header: &[&str]) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SinkError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(path).map_err(|source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(file);

        let mut log = Self {
            path: path.to_path_buf(),
            writer,
        };
        log.write_row(header)?;
        tracing::debug!(path = %path.display(), "log file reset");
        Ok(log)
    }

    fn write_row<I, T>(&mut self, row: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(row)
            .map_err(|e| SinkError::Csv {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        self.writer.flush().map_err(|source| SinkError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.writer
            .get_ref()
            .sync_data()
            .map_err(|source| SinkError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// The event log and alert log as CSV files.
pub struct CsvSink {
    events: LogFile,
    alerts: LogFile,
}

impl CsvSink {
    /// Create (or truncate) both logs and write their headers.
    ///
    /// Missing parent directories are created. Calling this again on the same
    /// paths resets both files to a single header row.
    pub fn create(paths: &OutputPaths) -> Result<Self, SinkError> {
        let events = LogFile::create(&paths.events, &EVENT_COLUMNS)?;
        let alerts = LogFile::create(&paths.alerts, &ALERT_COLUMNS)?;
        tracing::info!(
            events = %paths.events.display(),
            alerts = %paths.alerts.display(),
            "output logs initialised"
        );
        Ok(Self { events, alerts })
    }

    pub fn events_path(&self) -> &Path {
        &self.events.path
    }

    pub fn alerts_path(&self) -> &Path {
        &self.alerts.path
    }
}

impl RecordSink for CsvSink {
    fn append_event(&mut self, event: &MatchedEvent) -> Result<(), SinkError> {
        self.events.write_row(event.row())
    }

    fn append_alert(&mut self, alert: &AlertRecord) -> Result<(), SinkError> {
        self.alerts.write_row(alert.row())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikiwatch_core::{ChangeEvent, Watchlist};

    fn paths(dir: &Path) -> OutputPaths {
        OutputPaths {
            events: dir.join("data/events.csv"),
            alerts: dir.join("data/alerts.csv"),
        }
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn matched(comment: &str) -> MatchedEvent {
        let e = ChangeEvent {
            wiki: "enwiki".into(),
            title: Some("Drama film".into()),
            timestamp: Some(1_700_000_000),
            user: Some("ExampleUser".into()),
            kind: Some("edit".into()),
            comment: comment.into(),
            old_length: 100,
            new_length: 7000,
        };
        MatchedEvent::classify(e, "enwiki", &Watchlist::new(["Drama film"])).unwrap()
    }

    #[test]
    fn create_writes_headers_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(dir.path());
        let sink = CsvSink::create(&p).unwrap();
        assert_eq!(sink.events_path(), p.events);

        assert_eq!(
            read(&p.events),
            "timestamp,wiki,title,entity_match,user,type,comment,old_len,new_len,size_diff\r\n"
        );
        assert_eq!(
            read(&p.alerts),
            "timestamp,wiki,title,entity_match,user,type,comment,reason,old_len,new_len,size_diff\r\n"
        );
    }

    #[test]
    fn create_twice_resets_to_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(dir.path());
        {
            let mut sink = CsvSink::create(&p).unwrap();
            sink.append_event(&matched("fix")).unwrap();
        }
        CsvSink::create(&p).unwrap();
        CsvSink::create(&p).unwrap();

        assert_eq!(read(&p.events).lines().count(), 1);
        assert_eq!(read(&p.alerts).lines().count(), 1);
    }

    #[test]
    fn rows_are_visible_on_disk_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(dir.path());
        let mut sink = CsvSink::create(&p).unwrap();

        let m = matched("fix");
        sink.append_event(&m).unwrap();
        let alert = AlertRecord::new(m, &["Edit by target user ExampleUser".into()]).unwrap();
        sink.append_alert(&alert).unwrap();

        let events = read(&p.events);
        let lines: Vec<&str> = events.lines().collect();
        assert_eq!(
            lines[1],
            "2023-11-14T22:13:20,enwiki,Drama film,Drama film,ExampleUser,edit,fix,100,7000,6900"
        );
        let alerts = read(&p.alerts);
        assert_eq!(
            alerts.lines().nth(1).unwrap(),
            "2023-11-14T22:13:20,enwiki,Drama film,Drama film,ExampleUser,edit,fix,Edit by target user ExampleUser,100,7000,6900"
        );
    }

    #[test]
    fn awkward_comments_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(dir.path());
        let mut sink = CsvSink::create(&p).unwrap();
        sink.append_event(&matched("a, \"quoted\"\nsecond line")).unwrap();

        let mut reader = csv::Reader::from_path(&p.events).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][6], "a, \"quoted\"\nsecond line");
        assert_eq!(&records[0][9], "6900");
    }

    #[test]
    fn unwritable_location_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"").unwrap();
        let p = OutputPaths {
            events: blocker.join("events.csv"),
            alerts: dir.path().join("alerts.csv"),
        };
        let err = CsvSink::create(&p).err().unwrap();
        assert!(matches!(err, SinkError::Io { .. }));
        assert_eq!(err.path(), p.events);
    }
}
