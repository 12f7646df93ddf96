//! `HttpFeed`: server-sent-event source over HTTP(S), backed by `reqwest`.
//!
//! The response body is never buffered as a whole: chunks are framed into
//! lines as they arrive. There is no read timeout, since the feed is
//! unbounded and may be quiet for a while; only connecting is time-limited.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use std::time::Duration;

use wikiwatch_core::config::WatchConfig;
use wikiwatch_core::error::StreamError;

use crate::framing::frame_lines;
use crate::source::{FeedSource, LineStream};

/// Configuration for `HttpFeed`.
#[derive(Debug, Clone)]
pub struct HttpFeedConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
}

impl Default for HttpFeedConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("wikiwatch/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&WatchConfig> for HttpFeedConfig {
    fn from(config: &WatchConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }
}

/// Change feed read with a long-lived HTTP GET.
pub struct HttpFeed {
    url: String,
    http: reqwest::Client,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, config: HttpFeedConfig) -> Result<Self, StreamError> {
        let url = url.into();
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| StreamError::ConnectionFailed {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { url, http })
    }

    /// Feed for `config.endpoint` with the configured user agent and timeout.
    pub fn from_config(config: &WatchConfig) -> Result<Self, StreamError> {
        Self::new(config.endpoint.clone(), HttpFeedConfig::from(config))
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn connect(&self) -> Result<LineStream, StreamError> {
        tracing::debug!(url = %self.url, "opening event stream");
        let resp = self
            .http
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| StreamError::ConnectionFailed {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StreamError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let chunks = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| StreamError::Read(e.to_string())));
        Ok(frame_lines(chunks))
    }
}
