//! OpenAI non-streaming response parsing

use crate::openai::converter::{ContentPart, OpenAIResponse, OutputItem};
use crate::stream_utils::{decode_event, error_message, format_error, parse_payload, record_usage};
use unillm_core::{ChunkKind, ContentBlock, StreamChunk, StreamHistory};

/// Materialize a complete Responses API body into `history`
pub(crate) fn classify_completion(body: &str, history: &mut StreamHistory) {
    let Some(parsed) = parse_payload(body, body, history) else {
        return;
    };
    if let Some(error) = parsed.get("error").filter(|e| !e.is_null()) {
        let message = error_message(error);
        format_error(body, parsed, message, history);
        return;
    }
    let Some(response) = decode_event::<OpenAIResponse>(body, &parsed, history) else {
        return;
    };

    let info = response.info;
    let metadata = history.metadata_mut();
    metadata.id = info.id;
    metadata.model = info.model;
    metadata.stop_reason = info.status;
    if let Some(usage) = info.usage {
        record_usage(history, usage.input_tokens, usage.output_tokens);
    }

    let blocks = history.content_blocks_mut();
    for item in response.output {
        match item {
            OutputItem::Message { content } => {
                for part in content {
                    match part {
                        ContentPart::OutputText { text } => {
                            blocks.push(ContentBlock::text(text));
                        }
                        ContentPart::ToolUse { name, input } => {
                            blocks.push(ContentBlock::tool_call(name, input));
                        }
                        ContentPart::Unknown => {}
                    }
                }
            }
            OutputItem::FunctionCall { name, arguments } => {
                blocks.push(ContentBlock::tool_call_from_arguments(name, arguments));
            }
            OutputItem::Unknown => {}
        }
    }

    history.push_chunk(StreamChunk::new(ChunkKind::CompleteResponse, body).with_parsed(parsed));
}
