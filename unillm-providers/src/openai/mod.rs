//! OpenAI Responses API
//!
//! Streams are SSE with typed `response.*` events. Blocks are keyed by the
//! event's `output_index`.

pub(crate) mod converter;
pub(crate) mod parser;
pub(crate) mod stream;

pub use converter::OpenAIConverter;
pub use stream::OpenAIClassifier;
