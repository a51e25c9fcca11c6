//! High-level client API for LLM interactions
//!
//! [`Client`] wraps a configured provider, runs requests, and checks
//! structured output against the request's JSON schema, both on the finished
//! response and on every partial snapshot while streaming.

#![warn(missing_docs)]

mod client;
mod generation;
mod validator;

pub use client::Client;
pub use generation::{Generation, GenerationStream};
pub use validator::JsonSchemaValidator;

/// Prelude module for convenient imports
pub mod prelude {
    pub use super::{Client, Generation, GenerationStream};
    pub use unillm_core::{Message, ProviderKind, Request, Role};
    pub use unillm_providers::ProviderConfig;
}
