//! Error types for the WikiWatch pipeline.
//!
//! Lines that cannot be decoded are not errors: the decoder reports them as
//! [`DecodeOutcome`](crate::decoder::DecodeOutcome) variants and the session
//! skips them. Everything in this module is fatal for a running session.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the upstream feed connection.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Feed connection failed: {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Feed returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Feed read error: {0}")]
    Read(String),

    #[error("Feed stream closed by server")]
    Closed,
}

/// Errors from the output logs.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write failed on {}: {reason}", path.display())]
    Csv { path: PathBuf, reason: String },
}

impl SinkError {
    /// Path of the log that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Csv { path, .. } => path,
        }
    }
}

/// Errors loading or validating a [`WatchConfig`](crate::config::WatchConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {reason}")]
    Invalid { reason: String },
}

/// Terminal failure of a stream session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    /// `run` was called on a session that already stopped or failed.
    #[error("Session already finished ({state})")]
    Finished { state: String },
}

impl SessionError {
    /// Returns `true` if the failure came from the feed rather than the logs.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}
