//! Constants for provider implementations

use std::time::Duration;

/// Default Ollama base URL
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default Ollama model
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3.2";

/// Ollama chat endpoint
pub const OLLAMA_CHAT_PATH: &str = "/api/chat";

/// Default Anthropic base URL
pub const ANTHROPIC_DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default Anthropic model
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

/// Anthropic messages endpoint
pub const ANTHROPIC_MESSAGES_PATH: &str = "/v1/messages";

/// Anthropic API version header value
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Default OpenAI base URL
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default OpenAI model
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI responses endpoint
pub const OPENAI_RESPONSES_PATH: &str = "/v1/responses";

/// Default max tokens if not specified
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Name of the tool used to carry structured output
pub const STRUCTURED_OUTPUT_TOOL: &str = "structured_output";

/// Default whole-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
