//! Anthropic non-streaming response parsing

use crate::anthropic::converter::{AnthropicResponse, WireBlock};
use crate::stream_utils::{
    decode_event, error_message, format_error, parse_payload, record_usage, unhandled,
};
use tracing::debug;
use unillm_core::{ChunkKind, ContentBlock, StreamChunk, StreamHistory};

/// Materialize a complete Messages API body into `history`
///
/// `max_tokens` and `stop_sequence` are text-only endings like `end_turn`.
/// Tool calls are kept only for `tool_use`; any other stop reason leaves the
/// body as an unhandled event.
pub(crate) fn classify_completion(body: &str, history: &mut StreamHistory) {
    let Some(parsed) = parse_payload(body, body, history) else {
        return;
    };
    if let Some(error) = parsed.get("error").filter(|e| !e.is_null()) {
        let message = error_message(error);
        format_error(body, parsed, message, history);
        return;
    }
    let Some(response) = decode_event::<AnthropicResponse>(body, &parsed, history) else {
        return;
    };

    let metadata = history.metadata_mut();
    metadata.id = response.id;
    metadata.model = response.model;
    metadata.stop_reason = response.stop_reason.clone();
    if let Some(usage) = response.usage {
        record_usage(history, usage.input_tokens, usage.output_tokens);
    }

    let include_tools = match response.stop_reason.as_deref() {
        Some("end_turn") | Some("max_tokens") | Some("stop_sequence") => false,
        Some("tool_use") => true,
        other => {
            debug!(stop_reason = ?other, "Unrecognized stop reason");
            unhandled(body, Some(parsed), history);
            return;
        }
    };

    let blocks = history.content_blocks_mut();
    for block in response.content {
        match block {
            WireBlock::Text { text } => {
                blocks.push(ContentBlock::text(text));
            }
            WireBlock::ToolUse { name, input } if include_tools => {
                blocks.push(ContentBlock::tool_call(name, input));
            }
            WireBlock::ToolUse { .. } | WireBlock::Unknown => {}
        }
    }

    history.push_chunk(StreamChunk::new(ChunkKind::CompleteResponse, body).with_parsed(parsed));
}
