//! Common streaming utilities for all providers

use bytes::Bytes;
use futures::{ready, Stream};
use pin_project::pin_project;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;
use unillm_core::{StreamChunk, StreamHistory, Usage};

/// Buffer management for line-based streaming protocols
///
/// Bytes are split on `\n` before decoding, so a multi-byte character split
/// across two network reads is reassembled. Blank lines are kept since they
/// delimit SSE events.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    /// Create a new line buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Add data to buffer and return complete lines
    pub fn add_data(&mut self, data: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(data);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            lines.push(decode_line(&line[..pos]));
        }
        lines
    }

    /// Get any remaining data in the buffer
    pub fn flush(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            let rest = std::mem::take(&mut self.buffer);
            Some(decode_line(&rest))
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Adapts a byte stream into a stream of lines
///
/// The unterminated tail is yielded when the inner stream ends. An inner error
/// is passed through and ends the stream.
#[pin_project]
pub struct Lines<S> {
    #[pin]
    inner: S,
    buffer: LineBuffer,
    pending: VecDeque<String>,
    done: bool,
}

impl<S> Lines<S> {
    /// Wrap a byte stream
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: LineBuffer::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }
}

impl<S, E> Stream for Lines<S>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    type Item = Result<String, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(line) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(line)));
            }
            if *this.done {
                return Poll::Ready(None);
            }
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(bytes)) => this.pending.extend(this.buffer.add_data(&bytes)),
                Some(Err(e)) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    *this.done = true;
                    this.pending.extend(this.buffer.flush());
                }
            }
        }
    }
}

/// One line of an SSE stream, split by field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// A blank separator line
    Blank,
    /// A `data:` field with its value
    Data(&'a str),
    /// An `event:` field with its value
    Event(&'a str),
    /// Comments and any other field
    Other,
}

/// Common SSE (Server-Sent Events) parsing logic
pub fn parse_sse_line(line: &str) -> SseLine<'_> {
    if line.trim().is_empty() {
        return SseLine::Blank;
    }
    match line.split_once(':') {
        Some(("data", value)) => SseLine::Data(value.strip_prefix(' ').unwrap_or(value)),
        Some(("event", value)) => SseLine::Event(value.trim()),
        _ => SseLine::Other,
    }
}

/// Parse a line's JSON payload, recording a parse error when it is malformed
pub fn parse_payload(raw_line: &str, payload: &str, history: &mut StreamHistory) -> Option<Value> {
    match serde_json::from_str(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, line = raw_line, "Malformed JSON payload");
            history.push_chunk(StreamChunk::parse_error(raw_line, e));
            None
        }
    }
}

/// Decode an already parsed payload into a typed event, recording a format
/// error when its shape is wrong
pub fn decode_event<T: DeserializeOwned>(
    raw_line: &str,
    parsed: &Value,
    history: &mut StreamHistory,
) -> Option<T> {
    match Deserialize::deserialize(parsed) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, line = raw_line, "Payload does not match the expected shape");
            history.push_chunk(StreamChunk::format_error(raw_line, parsed.clone(), e.to_string()));
            None
        }
    }
}

/// Record a format error for a payload that is valid JSON with the wrong shape
pub fn format_error(
    raw_line: &str,
    parsed: Value,
    message: impl Into<String>,
    history: &mut StreamHistory,
) {
    let message = message.into();
    debug!(error = %message, line = raw_line, "Format error");
    history.push_chunk(StreamChunk::format_error(raw_line, parsed, message));
}

/// Record a format error for an event without a `type`
///
/// The provider's message is used when the line carries an `error`.
pub fn untyped_event(raw_line: &str, parsed: Value, history: &mut StreamHistory) {
    let message = match parsed.get("error").filter(|e| !e.is_null()) {
        Some(error) => error_message(error),
        None => "event has no type".to_string(),
    };
    format_error(raw_line, parsed, message, history);
}

/// Record an event this library does not model
pub fn unhandled(raw_line: &str, parsed: Option<Value>, history: &mut StreamHistory) {
    debug!(line = raw_line, "Unhandled event");
    history.push_chunk(StreamChunk::unhandled(raw_line, parsed));
}

/// Human-readable message from a provider `error` field
///
/// Providers send either `{"error": "text"}` or `{"error": {"message": ...}}`.
pub fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

/// Merge token counts into the history's usage, keeping counts already seen
pub fn record_usage(history: &mut StreamHistory, prompt: Option<u32>, completion: Option<u32>) {
    if prompt.is_none() && completion.is_none() {
        return;
    }
    let usage = history.metadata_mut().usage.get_or_insert_with(Usage::default);
    if let Some(prompt) = prompt {
        usage.prompt_tokens = prompt;
    }
    if let Some(completion) = completion {
        usage.completion_tokens = completion;
    }
}
