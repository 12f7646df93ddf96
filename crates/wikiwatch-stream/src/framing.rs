//! Line framing for server-sent events.
//!
//! The transport hands us arbitrary byte chunks. Lines may end in `\n`,
//! `\r\n` or a lone `\r`, and a terminator may be split across two chunks.

use bytes::{Buf, Bytes, BytesMut};
use futures::{stream, Stream, StreamExt};

use wikiwatch_core::error::StreamError;

use crate::source::LineStream;

/// Longest line accepted by [`frame_lines`]. The live feed's largest
/// `data:` lines are a few KiB.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Incremental splitter from byte chunks to lines.
#[derive(Debug)]
pub struct LineFramer {
    buf: BytesMut,
    /// Last terminator was `\r`; a `\n` at the front of the buffer belongs to it.
    after_cr: bool,
    /// Prefix of `buf` already known to hold no terminator.
    scanned: usize,
    max_line: usize,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Framer that rejects any unterminated line longer than `max_line` bytes.
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            after_cr: false,
            scanned: 0,
            max_line,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete line, if one is buffered.
    ///
    /// Fails once the pending unterminated line exceeds the length limit.
    pub fn next_line(&mut self) -> Result<Option<Bytes>, StreamError> {
        if self.after_cr {
            if self.buf.is_empty() {
                return Ok(None);
            }
            if self.buf[0] == b'\n' {
                self.buf.advance(1);
            }
            self.after_cr = false;
            self.scanned = 0;
        }

        let found = self.buf[self.scanned..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r');
        let Some(offset) = found else {
            self.scanned = self.buf.len();
            if self.buf.len() > self.max_line {
                return Err(StreamError::Read(format!(
                    "line exceeds {} bytes without a terminator",
                    self.max_line
                )));
            }
            return Ok(None);
        };

        let line = self.buf.split_to(self.scanned + offset).freeze();
        self.after_cr = self.buf[0] == b'\r';
        self.buf.advance(1);
        self.scanned = 0;
        Ok(Some(line))
    }

    /// Unterminated trailing bytes at end of stream.
    pub fn finish(&mut self) -> Option<Bytes> {
        self.after_cr = false;
        self.scanned = 0;
        if self.buf.is_empty() {
            None
        } else {
            Some(self.buf.split().freeze())
        }
    }

    /// Bytes buffered but not yet returned as a line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

/// Turn a stream of byte chunks into a [`LineStream`].
///
/// A chunk error, or a line longer than [`MAX_LINE_BYTES`], is forwarded
/// once and ends the stream. A trailing line without terminator is emitted
/// when the chunk stream ends.
pub fn frame_lines<S>(chunks: S) -> LineStream
where
    S: Stream<Item = Result<Bytes, StreamError>> + Send + 'static,
{
    let state = (Box::pin(chunks), LineFramer::new(), false);
    Box::pin(stream::unfold(
        state,
        |(mut chunks, mut framer, mut finished)| async move {
            loop {
                match framer.next_line() {
                    Ok(Some(line)) => return Some((Ok(line), (chunks, framer, finished))),
                    Ok(None) => {}
                    Err(e) => return Some((Err(e), (chunks, LineFramer::new(), true))),
                }
                if finished {
                    return None;
                }
                match chunks.next().await {
                    Some(Ok(chunk)) => framer.push(&chunk),
                    Some(Err(e)) => return Some((Err(e), (chunks, framer, true))),
                    None => {
                        finished = true;
                        if let Some(rest) = framer.finish() {
                            return Some((Ok(rest), (chunks, framer, finished)));
                        }
                    }
                }
            }
        },
    ))
}
