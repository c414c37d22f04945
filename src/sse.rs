//! Server-Sent Events (SSE) stream decoding.
//!
//! Every streaming endpoint of the API frames its output the same way:
//! ```text
//! event: message.output.delta
//! data: {"key": "value"}
//!
//! data: {"another": "event"}
//!
//! data: [DONE]
//! ```
//!
//! Only `data:` lines are inspected. Each one carries a complete JSON payload;
//! `event:`, `id:`, `retry:`, comments and blank lines are dropped. The
//! `[DONE]` sentinel ends the stream, and so does EOF.
//!
//! Two decoders share the same line handling: [`SseDecoder`] for blocking
//! readers and [`decode`] for async byte streams such as a
//! `reqwest::Response` body. Both are lazy and read nothing until the next
//! value is pulled.

use std::io::{BufRead, BufReader, Read};
use std::iter::FusedIterator;

use bytes::BytesMut;
use futures::stream::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::client::ClientError;

const DATA_PREFIX: &[u8] = b"data:";
const DONE_MARKER: &str = "[DONE]";

/// Check if an SSE data payload indicates the stream is done.
///
/// # Example
/// ```
/// use mistral_client::sse::is_done_marker;
///
/// assert!(is_done_marker("[DONE]"));
/// assert!(!is_done_marker(""));
/// assert!(!is_done_marker("{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &str) -> bool {
    data == DONE_MARKER
}

/// What a single raw line means to the decoder.
#[derive(Debug)]
enum Frame {
    Skip,
    Done,
    Data(Value),
}

/// Classify one raw line, newline included.
///
/// The prefix is matched against the untrimmed line; only the payload after
/// it is trimmed.
fn classify_line(line: &[u8]) -> Result<Frame, ClientError> {
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(Frame::Skip);
    };

    let payload = std::str::from_utf8(rest)?.trim();
    if is_done_marker(payload) {
        debug!("sse stream reached [DONE]");
        return Ok(Frame::Done);
    }

    trace!(payload, "sse data frame");
    Ok(Frame::Data(serde_json::from_str(payload)?))
}

/// Blocking SSE decoder over any [`BufRead`].
///
/// Yields one JSON value per `data:` line. After the sentinel, EOF, or the
/// first error, the iterator is exhausted and the reader is not touched
/// again.
///
/// # Example
/// ```
/// use mistral_client::sse::SseDecoder;
///
/// let body = "data: {\"n\":1}\n\ndata: [DONE]\n";
/// let values: Vec<_> = SseDecoder::new(body.as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(values, vec![serde_json::json!({"n": 1})]);
/// ```
#[derive(Debug)]
pub struct SseDecoder<R> {
    reader: R,
    line: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> SseDecoder<R> {
    /// Create a decoder positioned at the start of `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            finished: false,
        }
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> SseDecoder<BufReader<R>> {
    /// Wrap an unbuffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self::new(BufReader::new(reader))
    }
}

impl<R: BufRead> Iterator for SseDecoder<R> {
    type Item = Result<Value, ClientError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    debug!("sse stream closed without [DONE]");
                    self.finished = true;
                }
                Ok(_) => match classify_line(&self.line) {
                    Ok(Frame::Skip) => {}
                    Ok(Frame::Done) => self.finished = true,
                    Ok(Frame::Data(value)) => return Some(Ok(value)),
                    Err(e) => {
                        self.finished = true;
                        return Some(Err(e));
                    }
                },
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
        None
    }
}

impl<R: BufRead> FusedIterator for SseDecoder<R> {}

/// Splits incoming byte chunks into newline-terminated lines.
///
/// Lines are split off the front of the buffer without moving the bytes
/// behind them, so a chunk holding many lines is consumed in linear time.
#[derive(Debug, Default)]
struct LineBuffer {
    buf: BytesMut,
    // Bytes of `buf` already known to contain no newline.
    scanned: usize,
}

impl LineBuffer {
    fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn next_line(&mut self) -> Option<BytesMut> {
        match self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            Some(offset) => {
                let end = self.scanned + offset;
                self.scanned = 0;
                Some(self.buf.split_to(end + 1))
            }
            None => {
                self.scanned = self.buf.len();
                None
            }
        }
    }

    fn take_remainder(&mut self) -> Option<BytesMut> {
        self.scanned = 0;
        if self.buf.is_empty() {
            None
        } else {
            Some(self.buf.split())
        }
    }
}

/// Decode an async SSE byte stream into JSON values.
///
/// The returned stream polls `byte_stream` only when it has no complete line
/// buffered and the consumer asks for the next value. It stops polling after
/// `[DONE]`, after the byte stream ends, or after the first error, which is
/// yielded as the final item.
pub fn decode<S, B, E>(byte_stream: S) -> impl Stream<Item = Result<Value, ClientError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: Into<ClientError> + Send,
{
    async_stream::try_stream! {
        let mut byte_stream = Box::pin(byte_stream);
        let mut lines = LineBuffer::default();
        let mut eof = false;

        loop {
            let line = if let Some(line) = lines.next_line() {
                line
            } else if eof {
                match lines.take_remainder() {
                    Some(line) => line,
                    None => break,
                }
            } else {
                match byte_stream.next().await {
                    Some(chunk) => {
                        let chunk = chunk.map_err(|e| -> ClientError { e.into() })?;
                        lines.extend(chunk.as_ref());
                    }
                    None => {
                        debug!("sse stream closed without [DONE]");
                        eof = true;
                    }
                }
                continue;
            };

            match classify_line(&line)? {
                Frame::Skip => {}
                Frame::Done => break,
                Frame::Data(value) => yield value,
            }
        }
    }
}

/// Extension trait for `reqwest::Response` to enable SSE streaming.
///
/// # Example
/// ```ignore
/// use mistral_client::sse::SSEResponseExt;
///
/// let response = http.post(url).send().await?;
///
/// let mut stream = std::pin::pin!(response.sse_events::<CompletionChunk>());
/// while let Some(chunk) = stream.next().await {
///     println!("{:?}", chunk?);
/// }
/// ```
pub trait SSEResponseExt {
    /// Convert the response body into a stream of raw JSON payloads.
    fn sse(self) -> impl Stream<Item = Result<Value, ClientError>> + Send;

    /// Convert the response body into a stream of typed events.
    ///
    /// Each payload maps to exactly one `T`; a payload that does not fit `T`
    /// ends the stream with [`ClientError::Parse`].
    fn sse_events<T>(self) -> impl Stream<Item = Result<T, ClientError>> + Send
    where
        T: DeserializeOwned + Send + 'static;
}

impl SSEResponseExt for reqwest::Response {
    fn sse(self) -> impl Stream<Item = Result<Value, ClientError>> + Send {
        decode(self.bytes_stream())
    }

    fn sse_events<T>(self) -> impl Stream<Item = Result<T, ClientError>> + Send
    where
        T: DeserializeOwned + Send + 'static,
    {
        typed(self.sse())
    }
}

/// Map decoded JSON values into `T`, ending at the first failure.
pub(crate) fn typed<S, T>(values: S) -> impl Stream<Item = Result<T, ClientError>> + Send
where
    S: Stream<Item = Result<Value, ClientError>> + Send,
    T: DeserializeOwned + Send,
{
    values
        .map(|result| {
            result.and_then(|value| serde_json::from_value(value).map_err(ClientError::Parse))
        })
        .scan(false, |failed, item| {
            if *failed {
                return futures::future::ready(None);
            }
            *failed = item.is_err();
            futures::future::ready(Some(item))
        })
}
