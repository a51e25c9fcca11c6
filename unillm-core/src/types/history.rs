//! Per-request stream history

use crate::types::chunk::{ChunkKind, StreamChunk};
use crate::types::content::{ContentBlock, ContentBlocks};
use crate::types::tool::ToolCall;
use serde::Serialize;
use std::fmt;

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl Usage {
    /// Prompt plus completion tokens
    pub fn total_tokens(&self) -> u64 {
        u64::from(self.prompt_tokens) + u64::from(self.completion_tokens)
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Usage(prompt: {}, completion: {}, total: {})",
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens()
        )
    }
}

/// Response-level facts reported by the provider along the way
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamMetadata {
    /// Model that produced the response
    pub model: Option<String>,
    /// Provider-assigned response id
    pub id: Option<String>,
    /// Why generation stopped, in the provider's vocabulary
    pub stop_reason: Option<String>,
    /// Token usage, when reported
    pub usage: Option<Usage>,
}

/// Everything known about one in-flight response
///
/// A history belongs to exactly one request and is driven by one task. It
/// holds the append-only chunk log and the live content block sequence. The
/// reconstructed output is read from the blocks; the chunks only record what
/// happened.
#[derive(Debug, Clone, Default)]
pub struct StreamHistory {
    chunks: Vec<StreamChunk>,
    blocks: ContentBlocks,
    metadata: StreamMetadata,
}

impl StreamHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk, returning the history for chaining
    pub fn add_chunk(mut self, chunk: StreamChunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    /// Append a chunk in place
    pub fn push_chunk(&mut self, chunk: StreamChunk) -> &mut Self {
        self.chunks.push(chunk);
        self
    }

    /// The chunk log, oldest first
    pub fn chunks(&self) -> &[StreamChunk] {
        &self.chunks
    }

    /// The most recent chunk
    pub fn last_chunk(&self) -> Option<&StreamChunk> {
        self.chunks.last()
    }

    /// Chunks of one kind, oldest first
    pub fn chunks_of_kind(&self, kind: ChunkKind) -> impl Iterator<Item = &StreamChunk> {
        self.chunks.iter().filter(move |chunk| chunk.kind() == kind)
    }

    /// The reconstructed content blocks
    pub fn content_blocks(&self) -> &ContentBlocks {
        &self.blocks
    }

    /// Mutable access for classifiers
    pub fn content_blocks_mut(&mut self) -> &mut ContentBlocks {
        &mut self.blocks
    }

    /// Provider-reported metadata
    pub fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    /// Mutable metadata for classifiers
    pub fn metadata_mut(&mut self) -> &mut StreamMetadata {
        &mut self.metadata
    }

    /// Text of all text blocks, concatenated in index order
    pub fn full_text(&self) -> String {
        self.blocks.blocks().filter_map(ContentBlock::as_text).collect()
    }

    /// Tool calls in index order
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.blocks
            .blocks()
            .filter_map(|block| match block {
                ContentBlock::ToolCall { name, input, .. } => Some(ToolCall {
                    name: name.clone(),
                    input: input.clone(),
                }),
                ContentBlock::Text { .. } => None,
            })
            .collect()
    }

    /// The most recent chunk that is not an empty line
    ///
    /// SSE streams end every event with a blank line, so the chunk that
    /// decides how a response ended is usually not the very last one.
    pub fn last_event(&self) -> Option<&StreamChunk> {
        self.chunks
            .iter()
            .rev()
            .find(|chunk| chunk.kind() != ChunkKind::EmptyLine)
    }

    /// Whether the last event ended the response
    pub fn is_finished(&self) -> bool {
        self.last_event()
            .map(|chunk| chunk.kind().is_terminal())
            .unwrap_or(false)
    }

    /// The chunk that failed the call, if any
    ///
    /// A call has failed when its last event is an HTTP error or a format
    /// error. Earlier format errors that were followed by more output do not
    /// count.
    pub fn failure(&self) -> Option<&StreamChunk> {
        self.last_event()
            .filter(|chunk| matches!(chunk.kind(), ChunkKind::HttpError | ChunkKind::FormatError))
    }
}
