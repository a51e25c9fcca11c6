//! High-level client implementation

use crate::generation::{Generation, GenerationStream};
use crate::validator::JsonSchemaValidator;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use unillm_core::{Error, Message, Request, Result, SchemaValidator};
use unillm_providers::{Provider, ProviderConfig};

/// High-level client for LLM interactions
///
/// A client pairs a [`Provider`] with an optional schema validator. When no
/// validator is set, requests carrying a `response_schema` are validated
/// against that schema.
///
/// # Examples
///
/// ```no_run
/// use unillm_client::Client;
/// use unillm_core::ProviderKind;
/// use unillm_providers::ProviderConfig;
///
/// # async fn example() -> Result<(), unillm_core::Error> {
/// let config = ProviderConfig::new(ProviderKind::Ollama);
/// let client = Client::from_config(config)?;
///
/// let reply = client.chat("Hello, how are you?").await?;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    provider: Provider,
    validator: Option<Arc<dyn SchemaValidator>>,
}

impl Client {
    /// Create a new client with a provider
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            validator: None,
        }
    }

    /// Create a client and its provider from a configuration
    pub fn from_config(config: ProviderConfig) -> Result<Self> {
        Ok(Self::new(Provider::new(config)?))
    }

    /// Validate every response with a custom validator
    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Validate every response against a fixed JSON Schema
    pub fn with_schema(self, schema: &Value) -> Result<Self> {
        let validator = compile(schema)?;
        Ok(self.with_validator(validator))
    }

    /// Get a reference to the underlying provider
    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    fn validator_for(&self, request: &Request) -> Result<Option<Arc<dyn SchemaValidator>>> {
        if let Some(validator) = &self.validator {
            return Ok(Some(validator.clone()));
        }
        request.response_schema.as_ref().map(compile).transpose()
    }

    /// Run a request to completion
    pub async fn generate(&self, request: &Request) -> Result<Generation> {
        let validator = self.validator_for(request)?;
        let history = self.provider.complete(request).await?;
        let generation = Generation::new(history, validator.as_deref());
        info!(
            provider = %self.provider.kind(),
            success = generation.is_success(),
            "Generation finished"
        );
        Ok(generation)
    }

    /// Start a streaming request
    pub async fn stream(&self, request: &Request) -> Result<GenerationStream> {
        let validator = self.validator_for(request)?;
        let inner = self.provider.stream(request).await?;
        debug!(provider = %self.provider.kind(), "Generation stream opened");
        Ok(GenerationStream::new(inner, validator))
    }

    /// Send a single user message and return the reply text
    pub async fn chat(&self, prompt: impl Into<String>) -> Result<String> {
        let request = Request::new(vec![Message::user(prompt)]);
        let generation = self.generate(&request).await?.into_result()?;
        Ok(generation.content.text)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("provider", &self.provider)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

fn compile(schema: &Value) -> Result<Arc<dyn SchemaValidator>> {
    let validator =
        JsonSchemaValidator::new(schema).map_err(|e| Error::Validation(e.to_string()))?;
    Ok(Arc::new(validator))
}
