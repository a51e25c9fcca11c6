//! Reconstructed output blocks
//!
//! Providers address every piece of output by an integer index. Indices can be
//! sparse (Anthropic may put a tool call at index 1 after a text block at
//! index 0, OpenAI numbers output items), so blocks are kept in an ordered map
//! rather than a vector.
//!
//! Creating a block twice at the same index, or sending a delta to an index
//! without a block of the right variant, means a classifier is broken. These
//! cases panic instead of returning an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One unit of reconstructed model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Natural-language text
    Text {
        /// Text accumulated so far
        text: String,
    },
    /// A tool invocation
    ToolCall {
        /// Tool name
        name: String,
        /// Parsed arguments; an empty object until the arguments are complete
        input: Value,
        /// Raw argument JSON as it arrived on the wire
        input_json_buffer: String,
    },
}

impl ContentBlock {
    /// A text block
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// A tool call block with an empty argument buffer
    pub fn tool_call(name: impl Into<String>, input: Value) -> Self {
        ContentBlock::ToolCall {
            name: name.into(),
            input,
            input_json_buffer: String::new(),
        }
    }

    /// A tool call block whose arguments arrived as one raw string
    ///
    /// The string is parsed eagerly. When it is not valid JSON the input stays
    /// an empty object and the raw string is kept in the buffer.
    pub fn tool_call_from_arguments(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        let arguments = arguments.into();
        ContentBlock::ToolCall {
            name: name.into(),
            input: parse_arguments(&arguments).unwrap_or_else(empty_input),
            input_json_buffer: arguments,
        }
    }

    /// Text of a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::ToolCall { .. } => None,
        }
    }

    /// Whether this is a text block
    pub fn is_text(&self) -> bool {
        matches!(self, ContentBlock::Text { .. })
    }

    /// Whether this is a tool call block
    pub fn is_tool_call(&self) -> bool {
        matches!(self, ContentBlock::ToolCall { .. })
    }

    fn variant_name(&self) -> &'static str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::ToolCall { .. } => "tool_call",
        }
    }
}

/// The empty tool input, `{}`
pub fn empty_input() -> Value {
    Value::Object(Map::new())
}

fn parse_arguments(arguments: &str) -> Option<Value> {
    if arguments.trim().is_empty() {
        return None;
    }
    serde_json::from_str(arguments).ok()
}

/// Ordered, index-addressed sequence of content blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentBlocks {
    blocks: BTreeMap<usize, ContentBlock>,
}

impl ContentBlocks {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a block at a provider-assigned index
    ///
    /// # Panics
    ///
    /// Panics if a block already exists at `index`.
    pub fn start(&mut self, index: usize, block: ContentBlock) {
        if let Some(existing) = self.blocks.get(&index) {
            panic!(
                "content block already started at index {} (existing {}, new {})",
                index,
                existing.variant_name(),
                block.variant_name()
            );
        }
        self.blocks.insert(index, block);
    }

    /// Append a block after the highest occupied index and return its index
    pub fn push(&mut self, block: ContentBlock) -> usize {
        let index = self.next_index();
        self.blocks.insert(index, block);
        index
    }

    /// The index `push` would use next
    pub fn next_index(&self) -> usize {
        self.blocks
            .last_key_value()
            .map(|(index, _)| index + 1)
            .unwrap_or(0)
    }

    /// Append text to the text block at `index`
    ///
    /// # Panics
    ///
    /// Panics if there is no text block at `index`.
    pub fn append_text(&mut self, index: usize, delta: &str) {
        match self.blocks.get_mut(&index) {
            Some(ContentBlock::Text { text }) => text.push_str(delta),
            Some(other) => panic!(
                "text delta for index {} which holds a {} block",
                index,
                other.variant_name()
            ),
            None => panic!("text delta for index {} which has no block", index),
        }
    }

    /// Append a raw argument fragment to the tool call at `index`
    ///
    /// # Panics
    ///
    /// Panics if there is no tool call block at `index`.
    pub fn append_tool_json(&mut self, index: usize, fragment: &str) {
        self.tool_call_mut(index).2.push_str(fragment);
    }

    /// Parse the accumulated argument buffer of the tool call at `index`
    ///
    /// On success the parsed value replaces `input` and `true` is returned.
    /// An empty or malformed buffer leaves `input` untouched. The raw buffer
    /// is kept either way.
    ///
    /// # Panics
    ///
    /// Panics if there is no tool call block at `index`.
    pub fn finish_tool_call(&mut self, index: usize) -> bool {
        let (_, input, buffer) = self.tool_call_mut(index);
        match parse_arguments(buffer) {
            Some(value) => {
                *input = value;
                true
            }
            None => false,
        }
    }

    fn tool_call_mut(&mut self, index: usize) -> (&mut String, &mut Value, &mut String) {
        match self.blocks.get_mut(&index) {
            Some(ContentBlock::ToolCall {
                name,
                input,
                input_json_buffer,
            }) => (name, input, input_json_buffer),
            Some(other) => panic!(
                "tool call update for index {} which holds a {} block",
                index,
                other.variant_name()
            ),
            None => panic!("tool call update for index {} which has no block", index),
        }
    }

    /// The block at `index`
    pub fn get(&self, index: usize) -> Option<&ContentBlock> {
        self.blocks.get(&index)
    }

    /// Whether a block exists at `index`
    pub fn contains(&self, index: usize) -> bool {
        self.blocks.contains_key(&index)
    }

    /// Index of the last text block, if any
    pub fn last_text_index(&self) -> Option<usize> {
        self.blocks
            .iter()
            .rev()
            .find(|(_, block)| block.is_text())
            .map(|(index, _)| *index)
    }

    /// Blocks with their indices, in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ContentBlock)> {
        self.blocks.iter().map(|(index, block)| (*index, block))
    }

    /// Blocks in index order
    pub fn blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.values()
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether there are no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
