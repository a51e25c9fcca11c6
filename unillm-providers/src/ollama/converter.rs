//! Conversion between unillm types and Ollama API types

use crate::config::ProviderConfig;
use crate::constants::OLLAMA_CHAT_PATH;
use crate::error;
use crate::http::create_headers;
use crate::traits::RequestConverter;
use crate::utils;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use unillm_core::{ContentBlock, Error, Request, Role};

// Ollama API request types
#[derive(Debug, Serialize)]
pub struct OllamaRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OllamaOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<OllamaTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct OllamaMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Default, Serialize)]
pub struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct OllamaTool {
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    pub function: OllamaFunction,
}

#[derive(Debug, Serialize)]
pub struct OllamaFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

// Ollama API response types
#[derive(Debug, Deserialize)]
pub struct OllamaToolCall {
    pub function: OllamaFunctionCall,
}

#[derive(Debug, Deserialize)]
pub struct OllamaFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl OllamaToolCall {
    /// The call as a complete content block
    ///
    /// Arguments normally arrive as an object. Some models send them as a
    /// JSON string instead, which is parsed like a streamed buffer.
    pub fn into_block(self) -> ContentBlock {
        let OllamaFunctionCall { name, arguments } = self.function;
        match arguments {
            Value::String(raw) => ContentBlock::tool_call_from_arguments(name, raw),
            Value::Null => ContentBlock::tool_call(name, json!({})),
            input => ContentBlock::ToolCall {
                name,
                input_json_buffer: input.to_string(),
                input,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OllamaStreamMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<OllamaToolCall>,
}

/// One NDJSON line, or a whole non-streaming body
#[derive(Debug, Deserialize)]
pub struct OllamaChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub message: Option<OllamaStreamMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    // Counts are only present in the final message
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

// Conversion functions
pub fn to_ollama_request(
    request: &Request,
    config: &ProviderConfig,
    stream: bool,
) -> OllamaRequest {
    let mut messages = Vec::new();
    if let Some(system) = utils::system_prompt(request, config) {
        messages.push(OllamaMessage {
            role: Role::System.as_str(),
            content: system,
        });
    }
    messages.extend(request.conversation().map(|msg| OllamaMessage {
        role: msg.role.as_str(),
        content: msg.content.clone(),
    }));

    let params = &request.parameters;
    let options = OllamaOptions {
        temperature: params.temperature,
        top_p: params.top_p,
        stop: params.stop.clone(),
        num_predict: params.max_tokens,
    };
    let has_options = options.temperature.is_some()
        || options.top_p.is_some()
        || !options.stop.is_empty()
        || options.num_predict.is_some();

    let tools = if utils::tools_enabled(request, config) {
        request
            .tools
            .iter()
            .map(|tool| OllamaTool {
                tool_type: "function",
                function: OllamaFunction {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                },
            })
            .collect()
    } else {
        Vec::new()
    };

    OllamaRequest {
        model: utils::model_for(request, config),
        messages,
        stream,
        options: has_options.then_some(options),
        tools,
        format: utils::native_schema(request, config).cloned(),
    }
}

/// Request converter for the Ollama chat API
#[derive(Debug, Clone, Copy, Default)]
pub struct OllamaConverter;

impl RequestConverter for OllamaConverter {
    fn convert_request(
        &self,
        request: &Request,
        config: &ProviderConfig,
        stream: bool,
    ) -> Result<Value, Error> {
        serde_json::to_value(to_ollama_request(request, config, stream))
            .map_err(error::serialization_error)
    }

    fn endpoint(&self, config: &ProviderConfig) -> String {
        config.endpoint(OLLAMA_CHAT_PATH)
    }

    fn headers(&self, _config: &ProviderConfig) -> Result<HeaderMap, Error> {
        create_headers(None)
    }
}
