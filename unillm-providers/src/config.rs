//! Provider configuration
//!
//! Configuration is plain data handed in by the caller. Nothing here reads
//! files or the environment.

use crate::constants::*;
use std::time::Duration;
use unillm_core::{Error, ProviderKind};
use url::Url;

/// What a provider/model combination supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// A response schema can be sent as a request parameter. When false the
    /// schema is written into the system prompt instead.
    pub structured_output: bool,
    /// Tool definitions can be sent
    pub tool_calling: bool,
}

impl Capabilities {
    /// Defaults for a provider
    pub fn for_provider(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Anthropic | ProviderKind::OpenAI | ProviderKind::Ollama => Self {
                structured_output: true,
                tool_calling: true,
            },
        }
    }
}

/// Configuration for one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Which provider this talks to
    pub kind: ProviderKind,
    /// API key for authentication (unused by Ollama)
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Default model to use if not specified in requests
    pub default_model: String,
    /// Feature support for this provider
    pub capabilities: Capabilities,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Configuration with the provider's defaults and no API key
    pub fn new(kind: ProviderKind) -> Self {
        let (base_url, default_model) = match kind {
            ProviderKind::Anthropic => (ANTHROPIC_DEFAULT_BASE_URL, ANTHROPIC_DEFAULT_MODEL),
            ProviderKind::OpenAI => (OPENAI_DEFAULT_BASE_URL, OPENAI_DEFAULT_MODEL),
            ProviderKind::Ollama => (OLLAMA_DEFAULT_BASE_URL, OLLAMA_DEFAULT_MODEL),
        };
        Self {
            kind,
            api_key: String::new(),
            base_url: base_url.to_string(),
            default_model: default_model.to_string(),
            capabilities: Capabilities::for_provider(kind),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a new configuration builder
    pub fn builder(kind: ProviderKind) -> ProviderConfigBuilder {
        ProviderConfigBuilder::new(kind)
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Check that the configuration can be used to make requests
    pub fn validate(&self) -> Result<(), Error> {
        Url::parse(&self.base_url).map_err(|e| {
            Error::Configuration(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        if self.default_model.trim().is_empty() {
            return Err(Error::Configuration("Default model must not be empty".into()));
        }
        if self.kind != ProviderKind::Ollama && self.api_key.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "An API key is required for {}",
                self.kind
            )));
        }
        Ok(())
    }

    /// Full URL for an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Builder for [`ProviderConfig`]
pub struct ProviderConfigBuilder {
    kind: ProviderKind,
    api_key: Option<String>,
    base_url: Option<String>,
    default_model: Option<String>,
    capabilities: Option<Capabilities>,
    timeout: Option<Duration>,
}

impl ProviderConfigBuilder {
    /// Create a new builder
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            base_url: None,
            default_model: None,
            capabilities: None,
            timeout: None,
        }
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the default model
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Override the capability table
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ProviderConfig, Error> {
        let defaults = ProviderConfig::new(self.kind);
        let config = ProviderConfig {
            kind: self.kind,
            api_key: self.api_key.unwrap_or(defaults.api_key),
            base_url: self.base_url.unwrap_or(defaults.base_url),
            default_model: self.default_model.unwrap_or(defaults.default_model),
            capabilities: self.capabilities.unwrap_or(defaults.capabilities),
            timeout: self.timeout.unwrap_or(defaults.timeout),
        };
        config.validate()?;
        Ok(config)
    }
}
