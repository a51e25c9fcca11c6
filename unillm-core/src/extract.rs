//! Projections from a stream history to validator input

use crate::partial_json::{PartialJsonParser, PartialJsonResult};
use crate::types::content::ContentBlock;
use crate::types::history::StreamHistory;
use crate::types::tool::ToolCall;
use serde::Serialize;
use serde_json::{Map, Value};

/// Plain output of a response: its text and its tool calls
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedContent {
    /// All text blocks, concatenated in index order
    pub text: String,
    /// All tool calls, in index order
    pub tool_calls: Vec<ToolCall>,
}

impl ExtractedContent {
    /// Check if the response contains tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Pure projections over a [`StreamHistory`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentExtractor;

impl ContentExtractor {
    /// Text and tool calls reconstructed so far
    pub fn extract(history: &StreamHistory) -> ExtractedContent {
        ExtractedContent {
            text: history.full_text(),
            tool_calls: history.tool_calls(),
        }
    }

    /// The JSON object a schema validator should see
    ///
    /// When the response has text, this is the partial parse of that text.
    /// A response without text may carry its structured output as the
    /// arguments of a forced tool call; the first tool call's arguments are
    /// used then, parsed partially from the raw buffer while they are still
    /// arriving.
    pub fn structured(history: &StreamHistory) -> PartialJsonResult {
        let text = history.full_text();
        if !text.trim().is_empty() {
            return PartialJsonParser::parse(&text);
        }

        let first_tool = history
            .content_blocks()
            .blocks()
            .find(|block| block.is_tool_call());

        match first_tool {
            Some(ContentBlock::ToolCall {
                input,
                input_json_buffer,
                ..
            }) => match input {
                Value::Object(map) if !map.is_empty() => map.clone(),
                _ => PartialJsonParser::parse(input_json_buffer),
            },
            _ => Map::new(),
        }
    }
}
