//! Anthropic Messages API
//!
//! Streams arrive as SSE with one JSON event per `data:` line. Content blocks
//! carry their own `index`, so a tool call can start at index 1 while the text
//! block at index 0 is still open.

pub(crate) mod converter;
pub(crate) mod parser;
pub(crate) mod stream;

pub use converter::AnthropicConverter;
pub use stream::AnthropicClassifier;
