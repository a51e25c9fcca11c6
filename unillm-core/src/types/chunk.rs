//! Classified stream events
//!
//! Every raw line a classifier consumes leaves zero or more [`StreamChunk`]s in
//! the history. Chunks are the audit trail of what arrived on the wire; the
//! reconstructed output lives in the content blocks.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The closed set of events a classifier can record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkKind {
    /// The provider opened the response
    StreamStart,
    /// The provider closed the response
    StreamStop,
    /// A text block was created
    ContentBlockStart,
    /// Text was appended to a block
    ContentBlockDelta,
    /// A text block was closed
    ContentBlockStop,
    /// A tool call block was created
    ToolCallStart,
    /// Tool call arguments arrived (a fragment, or a whole call for Ollama)
    ToolCallDelta,
    /// A tool call is complete
    ToolCallStop,
    /// A non-streaming body was fully materialized
    CompleteResponse,
    /// The line's JSON body is malformed
    ParseError,
    /// The JSON is valid but lacks an expected field or shape
    FormatError,
    /// The transport failed; always the last chunk
    HttpError,
    /// A recognized event this library does not model
    UnhandledEvent,
    /// The NDJSON stream reported `done`
    CompletionEnd,
    /// A blank separator line
    EmptyLine,
}

impl ChunkKind {
    /// Stable kebab-case name, matching the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            ChunkKind::StreamStart => "stream-start",
            ChunkKind::StreamStop => "stream-stop",
            ChunkKind::ContentBlockStart => "content-block-start",
            ChunkKind::ContentBlockDelta => "content-block-delta",
            ChunkKind::ContentBlockStop => "content-block-stop",
            ChunkKind::ToolCallStart => "tool-call-start",
            ChunkKind::ToolCallDelta => "tool-call-delta",
            ChunkKind::ToolCallStop => "tool-call-stop",
            ChunkKind::CompleteResponse => "complete-response",
            ChunkKind::ParseError => "parse-error",
            ChunkKind::FormatError => "format-error",
            ChunkKind::HttpError => "http-error",
            ChunkKind::UnhandledEvent => "unhandled-event",
            ChunkKind::CompletionEnd => "completion-end",
            ChunkKind::EmptyLine => "empty-line",
        }
    }

    /// Whether this kind reports a problem with the line or the transport
    pub fn is_error(self) -> bool {
        matches!(
            self,
            ChunkKind::ParseError | ChunkKind::FormatError | ChunkKind::HttpError
        )
    }

    /// Whether this kind marks the end of a response
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ChunkKind::StreamStop
                | ChunkKind::CompletionEnd
                | ChunkKind::CompleteResponse
                | ChunkKind::HttpError
        )
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified event
///
/// Fields are private; a chunk cannot change after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamChunk {
    kind: ChunkKind,
    raw_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parsed: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StreamChunk {
    /// Create a chunk of the given kind for a raw line
    pub fn new(kind: ChunkKind, raw_line: impl Into<String>) -> Self {
        Self {
            kind,
            raw_line: raw_line.into(),
            parsed: None,
            text: None,
            error: None,
        }
    }

    /// Attach the parsed JSON payload
    pub fn with_parsed(mut self, parsed: Value) -> Self {
        self.parsed = Some(parsed);
        self
    }

    /// Attach the text carried by this event
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attach an error description
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// A line whose JSON body could not be parsed
    pub fn parse_error(raw_line: impl Into<String>, error: impl fmt::Display) -> Self {
        Self::new(ChunkKind::ParseError, raw_line).with_error(error.to_string())
    }

    /// A line whose JSON is valid but has the wrong shape
    pub fn format_error(raw_line: impl Into<String>, parsed: Value, error: impl Into<String>) -> Self {
        Self::new(ChunkKind::FormatError, raw_line)
            .with_parsed(parsed)
            .with_error(error)
    }

    /// A transport failure
    pub fn http_error(error: impl Into<String>) -> Self {
        Self::new(ChunkKind::HttpError, "").with_error(error)
    }

    /// A recognized but unmodeled event
    pub fn unhandled(raw_line: impl Into<String>, parsed: Option<Value>) -> Self {
        Self {
            parsed,
            ..Self::new(ChunkKind::UnhandledEvent, raw_line)
        }
    }

    /// The event kind
    pub fn kind(&self) -> ChunkKind {
        self.kind
    }

    /// The line exactly as received
    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    /// The parsed JSON payload, if the line carried one
    pub fn parsed(&self) -> Option<&Value> {
        self.parsed.as_ref()
    }

    /// Text carried by the event (a delta, or tool arguments)
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Error description for error kinds
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ChunkKind::ContentBlockDelta).unwrap();
        assert_eq!(json, "\"content-block-delta\"");
        assert_eq!(ChunkKind::ToolCallStop.to_string(), "tool-call-stop");
    }

    #[test]
    fn test_kind_classification() {
        assert!(ChunkKind::HttpError.is_error());
        assert!(ChunkKind::HttpError.is_terminal());
        assert!(ChunkKind::ParseError.is_error());
        assert!(!ChunkKind::ParseError.is_terminal());
        assert!(!ChunkKind::UnhandledEvent.is_error());
        assert!(ChunkKind::CompletionEnd.is_terminal());
    }

    #[test]
    fn test_constructors() {
        let chunk = StreamChunk::format_error("data: {}", json!({}), "missing type");
        assert_eq!(chunk.kind(), ChunkKind::FormatError);
        assert_eq!(chunk.raw_line(), "data: {}");
        assert_eq!(chunk.parsed(), Some(&json!({})));
        assert_eq!(chunk.error(), Some("missing type"));
        assert!(chunk.text().is_none());

        let chunk = StreamChunk::http_error("connection reset");
        assert_eq!(chunk.raw_line(), "");
        assert_eq!(chunk.error(), Some("connection reset"));

        let chunk = StreamChunk::unhandled(": ping", None);
        assert_eq!(chunk.kind(), ChunkKind::UnhandledEvent);
        assert!(chunk.parsed().is_none());
    }
}
