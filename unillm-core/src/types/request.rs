//! Provider-independent requests

use crate::types::message::{Message, Role};
use crate::types::tool::Tool;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A model identifier, passed to the provider as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model(pub String);

impl Model {
    /// The identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Model {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Model {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sampling settings; unset values are left to the provider
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    /// Upper bound on generated tokens
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Nucleus sampling cutoff
    pub top_p: Option<f32>,
    /// Sequences that end generation. Not every provider accepts them.
    pub stop: Vec<String>,
}

/// One call to a model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    /// The conversation, system messages included
    pub messages: Vec<Message>,
    /// The model to use; the provider's default when unset
    pub model: Option<Model>,
    /// Sampling settings
    pub parameters: Parameters,
    /// Tools the model may call
    pub tools: Vec<Tool>,
    /// JSON Schema the response must conform to
    pub response_schema: Option<Value>,
}

impl Request {
    /// Start building a request
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// A request with default settings
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Whether any tools are offered
    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// System messages joined with blank lines, if there are any
    ///
    /// Every supported provider takes the system prompt apart from the
    /// conversation, so system messages are hoisted wherever they appear.
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }

    /// Messages other than system messages, in order
    pub fn conversation(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}

/// Fluent construction of a [`Request`]
#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Append a message
    pub fn message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    /// Append several messages
    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.request.messages.extend(messages);
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<Model>) -> Self {
        self.request.model = Some(model.into());
        self
    }

    /// Replace all sampling settings
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.request.parameters = parameters;
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.parameters.temperature = Some(temperature);
        self
    }

    /// Set the nucleus sampling cutoff
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.request.parameters.top_p = Some(top_p);
        self
    }

    /// Cap the generated tokens
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.request.parameters.max_tokens = Some(tokens);
        self
    }

    /// Add a stop sequence
    pub fn stop(mut self, sequence: impl Into<String>) -> Self {
        self.request.parameters.stop.push(sequence.into());
        self
    }

    /// Offer a tool
    pub fn tool(mut self, tool: Tool) -> Self {
        self.request.tools.push(tool);
        self
    }

    /// Require the response to match a JSON Schema
    pub fn response_schema(mut self, schema: Value) -> Self {
        self.request.response_schema = Some(schema);
        self
    }

    /// Build without checks
    pub fn build(self) -> Request {
        self.request
    }

    /// Build, rejecting requests no provider would accept
    pub fn try_build(self) -> Result<Request, BuildError> {
        let request = self.build();
        if request.messages.is_empty() {
            return Err(BuildError::NoMessages);
        }
        if request.response_schema.as_ref().is_some_and(|s| !s.is_object()) {
            return Err(BuildError::InvalidSchema);
        }
        Ok(request)
    }
}

/// Why a request could not be built
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// No messages were added
    #[error("Request must contain at least one message")]
    NoMessages,
    /// The response schema is not a JSON object
    #[error("Response schema must be a JSON object")]
    InvalidSchema,
}
