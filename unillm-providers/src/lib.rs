//! Provider implementations for the unillm library
//!
//! Each provider module has three parts: a `converter` that builds the
//! outgoing request body, a `stream` classifier that turns raw wire lines into
//! chunks and content blocks, and a `parser` for complete non-streaming
//! bodies. [`Provider`] ties them to an [`HttpClient`] transport.

#![warn(missing_docs)]

pub mod classifier;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod provider;
pub mod stream_utils;
pub mod traits;
pub mod utils;

// Provider implementations
pub mod anthropic;
pub mod ollama;
pub mod openai;

pub use anthropic::{AnthropicClassifier, AnthropicConverter};
pub use classifier::Classifier;
pub use config::{Capabilities, ProviderConfig, ProviderConfigBuilder};
pub use http::{HttpClient, LineStream, ReqwestClient};
pub use ollama::{OllamaClassifier, OllamaConverter};
pub use openai::{OpenAIClassifier, OpenAIConverter};
pub use provider::{Provider, ResponseStream};
pub use traits::{RequestConverter, StreamClassifier};
