//! Conversion between unillm types and Anthropic API types

use crate::config::ProviderConfig;
use crate::constants::{
    ANTHROPIC_API_VERSION, ANTHROPIC_MESSAGES_PATH, DEFAULT_MAX_TOKENS, STRUCTURED_OUTPUT_TOOL,
};
use crate::error;
use crate::http::{create_headers, header_value};
use crate::traits::RequestConverter;
use crate::utils;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use unillm_core::types::content::empty_input;
use unillm_core::{Error, Request};

// Anthropic API request types
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub messages: Vec<AnthropicMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<AnthropicTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AnthropicMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct AnthropicTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

// Content blocks shared by streaming and complete responses
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        name: String,
        #[serde(default = "empty_input")]
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub input_tokens: Option<u32>,
    #[serde(default)]
    pub output_tokens: Option<u32>,
}

// Anthropic API response types
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub content: Vec<WireBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

// Streaming response types
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    MessageStart {
        message: StreamMessage,
    },
    ContentBlockStart {
        index: usize,
        content_block: WireBlock,
    },
    ContentBlockDelta {
        index: usize,
        delta: WireDelta,
    },
    ContentBlockStop {
        index: usize,
    },
    MessageDelta {
        #[serde(default)]
        delta: MessageDeltaBody,
        #[serde(default)]
        usage: Option<WireUsage>,
    },
    MessageStop,
    Ping,
    Error {
        error: Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct StreamMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireDelta {
    TextDelta { text: String },
    InputJsonDelta { partial_json: String },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageDeltaBody {
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// Build the Messages API body for a request
pub fn to_anthropic_request(
    request: &Request,
    config: &ProviderConfig,
    stream: bool,
) -> AnthropicRequest {
    let messages = request
        .conversation()
        .map(|msg| AnthropicMessage {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        })
        .collect();

    let mut tools: Vec<AnthropicTool> = if utils::tools_enabled(request, config) {
        request
            .tools
            .iter()
            .map(|tool| AnthropicTool {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.parameters.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    // Structured output travels as the input of a tool the model must call
    let tool_choice = utils::native_schema(request, config).map(|schema| {
        tools.push(AnthropicTool {
            name: STRUCTURED_OUTPUT_TOOL.to_string(),
            description: "Return the response as structured data".to_string(),
            input_schema: schema.clone(),
        });
        json!({"type": "tool", "name": STRUCTURED_OUTPUT_TOOL})
    });

    let params = &request.parameters;
    AnthropicRequest {
        model: utils::model_for(request, config),
        messages,
        max_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system: utils::system_prompt(request, config),
        temperature: params.temperature,
        top_p: params.top_p,
        stop_sequences: params.stop.clone(),
        stream: stream.then_some(true),
        tools,
        tool_choice,
    }
}

/// Request converter for the Anthropic Messages API
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicConverter;

impl RequestConverter for AnthropicConverter {
    fn convert_request(
        &self,
        request: &Request,
        config: &ProviderConfig,
        stream: bool,
    ) -> Result<Value, Error> {
        serde_json::to_value(to_anthropic_request(request, config, stream))
            .map_err(error::serialization_error)
    }

    fn endpoint(&self, config: &ProviderConfig) -> String {
        config.endpoint(ANTHROPIC_MESSAGES_PATH)
    }

    fn headers(&self, config: &ProviderConfig) -> Result<HeaderMap, Error> {
        let mut headers = create_headers(None)?;
        headers.insert("x-api-key", header_value("x-api-key", &config.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_API_VERSION),
        );
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use unillm_core::{Message, ProviderKind, Tool};

    fn config() -> ProviderConfig {
        ProviderConfig::new(ProviderKind::Anthropic).with_api_key("sk-ant-test")
    }

    #[test]
    fn test_request_body() {
        let request = Request::builder()
            .message(Message::system("You are terse."))
            .message(Message::user("Hello"))
            .message(Message::assistant("Hi"))
            .message(Message::user("Weather?"))
            .temperature(0.2)
            .tool(Tool::new(
                "weather",
                "Look up the weather",
                json!({"type": "object", "properties": {"city": {"type": "string"}}}),
            ))
            .build();

        let body = AnthropicConverter
            .convert_request(&request, &config(), true)
            .unwrap();

        assert_eq!(
            body,
            json!({
                "model": "claude-3-5-sonnet-latest",
                "messages": [
                    {"role": "user", "content": "Hello"},
                    {"role": "assistant", "content": "Hi"},
                    {"role": "user", "content": "Weather?"}
                ],
                "max_tokens": 4096,
                "system": "You are terse.",
                "temperature": 0.2f32,
                "stream": true,
                "tools": [{
                    "name": "weather",
                    "description": "Look up the weather",
                    "input_schema": {"type": "object", "properties": {"city": {"type": "string"}}}
                }]
            })
        );
    }

    #[test]
    fn test_stop_sequences() {
        let request = Request::builder()
            .message(Message::user("Count"))
            .stop("5")
            .max_tokens(10)
            .build();
        let body = AnthropicConverter
            .convert_request(&request, &config(), false)
            .unwrap();
        assert_eq!(body["stop_sequences"], json!(["5"]));
        assert_eq!(body["max_tokens"], json!(10));

        let body = AnthropicConverter
            .convert_request(&Request::new(vec![Message::user("Count")]), &config(), false)
            .unwrap();
        assert!(body.get("stop_sequences").is_none());
    }

    #[test]
    fn test_schema_becomes_forced_tool() {
        let schema = json!({"type": "object", "properties": {"name": {"type": "string"}}});
        let request = Request::builder()
            .message(Message::user("Name a person"))
            .response_schema(schema.clone())
            .build();

        let body = AnthropicConverter
            .convert_request(&request, &config(), false)
            .unwrap();

        assert_eq!(body["tools"][0]["name"], STRUCTURED_OUTPUT_TOOL);
        assert_eq!(body["tools"][0]["input_schema"], schema);
        assert_eq!(
            body["tool_choice"],
            json!({"type": "tool", "name": STRUCTURED_OUTPUT_TOOL})
        );
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_headers() {
        let headers = AnthropicConverter.headers(&config()).unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "sk-ant-test");
        assert_eq!(headers.get("anthropic-version").unwrap(), ANTHROPIC_API_VERSION);
        assert!(headers.get("authorization").is_none());
        assert_eq!(
            AnthropicConverter.endpoint(&config()),
            "https://api.anthropic.com/v1/messages"
        );
    }
}
