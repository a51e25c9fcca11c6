//! Core types for the unillm library
//!
//! This crate holds the provider-independent pieces of the response
//! reconstruction engine: the chunk taxonomy, the content block model, the
//! per-request [`StreamHistory`], the partial JSON parser and the projections
//! handed to schema validators.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod extract;
pub mod partial_json;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use error::{Error, Result};
pub use extract::{ContentExtractor, ExtractedContent};
pub use partial_json::{PartialJsonParser, PartialJsonResult};
pub use types::{
    chunk::{ChunkKind, StreamChunk},
    content::{ContentBlock, ContentBlocks},
    history::{StreamHistory, StreamMetadata, Usage},
    message::{Message, Role},
    provider::ProviderKind,
    request::{BuildError, Model, Parameters, Request, RequestBuilder},
    tool::{Tool, ToolCall},
};
pub use validation::{SchemaValidator, Validation, ValidationError};
