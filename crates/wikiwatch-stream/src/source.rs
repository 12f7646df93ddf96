//! `FeedSource` trait: abstraction over where feed lines come from.
//!
//! The production implementation is [`HttpFeed`](crate::http::HttpFeed);
//! tests plug in scripted sources.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use wikiwatch_core::error::StreamError;

/// Lines of the feed, without their terminators, in arrival order.
pub type LineStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>;

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Endpoint this source reads from (for diagnostics).
    fn endpoint(&self) -> &str;

    /// Open the connection and return its line stream.
    ///
    /// Dropping the stream releases the connection.
    async fn connect(&self) -> Result<LineStream, StreamError>;
}
