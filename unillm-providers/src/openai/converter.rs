//! Request conversion and wire types for OpenAI

use crate::config::ProviderConfig;
use crate::constants::{OPENAI_RESPONSES_PATH, STRUCTURED_OUTPUT_TOOL};
use crate::http::create_headers;
use crate::traits::RequestConverter;
use crate::utils;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::{json, Value};
use unillm_core::types::content::empty_input;
use unillm_core::{Error, Request, Tool};

/// Converts generic requests to Responses API bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAIConverter;

impl RequestConverter for OpenAIConverter {
    fn convert_request(
        &self,
        request: &Request,
        config: &ProviderConfig,
        stream: bool,
    ) -> Result<Value, Error> {
        let input: Vec<Value> = request
            .conversation()
            .map(|msg| json!({"role": msg.role.as_str(), "content": msg.content}))
            .collect();

        let mut body = json!({
            "model": utils::model_for(request, config),
            "input": input,
            "stream": stream,
        });

        if let Some(instructions) = utils::system_prompt(request, config) {
            body["instructions"] = json!(instructions);
        }

        // Add parameters
        let params = &request.parameters;
        if let Some(max_tokens) = params.max_tokens {
            body["max_output_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = params.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(top_p) = params.top_p {
            body["top_p"] = json!(top_p);
        }

        if utils::tools_enabled(request, config) {
            body["tools"] = json!(convert_tools(&request.tools));
        }

        if let Some(schema) = utils::native_schema(request, config) {
            body["text"] = json!({
                "format": {
                    "type": "json_schema",
                    "name": STRUCTURED_OUTPUT_TOOL,
                    "schema": schema,
                    "strict": false,
                }
            });
        }

        Ok(body)
    }

    fn endpoint(&self, config: &ProviderConfig) -> String {
        config.endpoint(OPENAI_RESPONSES_PATH)
    }

    fn headers(&self, config: &ProviderConfig) -> Result<HeaderMap, Error> {
        create_headers(Some(&config.api_key))
    }
}

fn convert_tools(tools: &[Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            })
        })
        .collect()
}

// Response types shared by streaming and complete bodies
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    FunctionCall {
        name: String,
        #[serde(default)]
        arguments: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText {
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
pub struct OpenAIUsage {
    #[serde(default)]
    pub input_tokens: Option<u32>,
    #[serde(default)]
    pub output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(flatten)]
    pub info: ResponseInfo,
    pub output: Vec<OutputItem>,
}

// Streaming event types
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "response.created")]
    Created { response: ResponseInfo },
    #[serde(rename = "response.output_item.added")]
    OutputItemAdded { output_index: usize, item: OutputItem },
    #[serde(rename = "response.content_part.added")]
    ContentPartAdded { output_index: usize, part: ContentPart },
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta { output_index: usize, delta: String },
    #[serde(rename = "response.output_text.done", alias = "response.content_part.done")]
    TextDone,
    #[serde(rename = "response.function_call_arguments.delta")]
    ArgumentsDelta { output_index: usize, delta: String },
    #[serde(rename = "response.function_call_arguments.done")]
    ArgumentsDone { output_index: usize },
    #[serde(rename = "response.completed", alias = "response.done")]
    Completed {
        #[serde(default)]
        response: Option<ResponseInfo>,
    },
    #[serde(rename = "response.failed", alias = "error")]
    Failed,
    #[serde(other)]
    Unknown,
}
