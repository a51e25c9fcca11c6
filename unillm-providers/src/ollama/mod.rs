//! Ollama chat API
//!
//! Streams are newline-delimited JSON. Tool calls arrive whole, never as
//! fragments, and all text goes to a single text block.

pub(crate) mod converter;
pub(crate) mod parser;
pub(crate) mod stream;

pub use converter::OllamaConverter;
pub use stream::OllamaClassifier;
