//! Common utilities for request converters

use crate::config::ProviderConfig;
use serde_json::Value;
use unillm_core::Request;

/// Model to use for a request: the request's own, or the configured default
pub fn model_for(request: &Request, config: &ProviderConfig) -> String {
    request
        .model
        .as_ref()
        .map(|m| m.0.clone())
        .unwrap_or_else(|| config.default_model.clone())
}

/// Instructions asking the model to answer with JSON matching `schema`
pub fn schema_instructions(schema: &Value) -> String {
    let rendered = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "Respond only with a JSON object that conforms to this JSON Schema:\n{}",
        rendered
    )
}

/// System prompt to send, with schema instructions folded in when the
/// provider cannot take the schema as a parameter
pub fn system_prompt(request: &Request, config: &ProviderConfig) -> Option<String> {
    let base = request.system_prompt();
    let instructions = match &request.response_schema {
        Some(schema) if !config.capabilities.structured_output => Some(schema_instructions(schema)),
        _ => None,
    };
    match (base, instructions) {
        (Some(base), Some(extra)) => Some(format!("{}\n\n{}", base, extra)),
        (base, extra) => base.or(extra),
    }
}

/// The response schema, when it should travel as a request parameter
pub fn native_schema<'a>(request: &'a Request, config: &ProviderConfig) -> Option<&'a Value> {
    if config.capabilities.structured_output {
        request.response_schema.as_ref()
    } else {
        None
    }
}

/// Tools, when the provider accepts them
pub fn tools_enabled(request: &Request, config: &ProviderConfig) -> bool {
    request.has_tools() && config.capabilities.tool_calling
}
