//! Anthropic stream classification

use crate::anthropic::converter::{StreamEvent, WireBlock, WireDelta};
use crate::anthropic::parser;
use crate::stream_utils::{
    decode_event, error_message, format_error, parse_payload, parse_sse_line, record_usage,
    unhandled, untyped_event, SseLine,
};
use crate::traits::StreamClassifier;
use serde_json::Value;
use tracing::trace;
use unillm_core::{ChunkKind, ContentBlock, StreamChunk, StreamHistory};

/// Classifier for Anthropic SSE streams
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicClassifier;

impl AnthropicClassifier {
    fn classify_event(&self, line: &str, parsed: Value, history: &mut StreamHistory) {
        if parsed.get("type").and_then(Value::as_str).is_none() {
            untyped_event(line, parsed, history);
            return;
        }
        let Some(event) = decode_event::<StreamEvent>(line, &parsed, history) else {
            return;
        };

        let chunk = |kind: ChunkKind, parsed: Value| StreamChunk::new(kind, line).with_parsed(parsed);

        match event {
            StreamEvent::MessageStart { message } => {
                let metadata = history.metadata_mut();
                metadata.id = message.id;
                metadata.model = message.model;
                if let Some(usage) = message.usage {
                    record_usage(history, usage.input_tokens, usage.output_tokens);
                }
                history.push_chunk(chunk(ChunkKind::StreamStart, parsed));
            }
            StreamEvent::ContentBlockStart {
                index,
                content_block,
            } => match content_block {
                WireBlock::Text { text } => {
                    history
                        .content_blocks_mut()
                        .start(index, ContentBlock::text(text));
                    history.push_chunk(chunk(ChunkKind::ContentBlockStart, parsed));
                }
                WireBlock::ToolUse { name, input } => {
                    history
                        .content_blocks_mut()
                        .start(index, ContentBlock::tool_call(name, input));
                    history.push_chunk(chunk(ChunkKind::ToolCallStart, parsed));
                }
                WireBlock::Unknown => unhandled(line, Some(parsed), history),
            },
            StreamEvent::ContentBlockDelta { index, delta } => match delta {
                WireDelta::TextDelta { text } => {
                    history.content_blocks_mut().append_text(index, &text);
                    history.push_chunk(chunk(ChunkKind::ContentBlockDelta, parsed).with_text(text));
                }
                WireDelta::InputJsonDelta { partial_json } => {
                    history
                        .content_blocks_mut()
                        .append_tool_json(index, &partial_json);
                    history.push_chunk(chunk(ChunkKind::ToolCallDelta, parsed).with_text(partial_json));
                }
                WireDelta::Unknown => unhandled(line, Some(parsed), history),
            },
            StreamEvent::ContentBlockStop { index } => {
                let is_tool_call = history
                    .content_blocks()
                    .get(index)
                    .map(ContentBlock::is_tool_call)
                    .unwrap_or(false);
                if is_tool_call {
                    history.content_blocks_mut().finish_tool_call(index);
                    history.push_chunk(chunk(ChunkKind::ToolCallStop, parsed));
                } else {
                    history.push_chunk(chunk(ChunkKind::ContentBlockStop, parsed));
                }
            }
            StreamEvent::MessageDelta { delta, usage } => {
                if delta.stop_reason.is_some() {
                    history.metadata_mut().stop_reason = delta.stop_reason;
                }
                if let Some(usage) = usage {
                    record_usage(history, usage.input_tokens, usage.output_tokens);
                }
                unhandled(line, Some(parsed), history);
            }
            StreamEvent::MessageStop => {
                history.push_chunk(chunk(ChunkKind::StreamStop, parsed));
            }
            StreamEvent::Error { error } => {
                format_error(line, parsed, error_message(&error), history);
            }
            StreamEvent::Ping | StreamEvent::Unknown => unhandled(line, Some(parsed), history),
        }
    }
}

impl StreamClassifier for AnthropicClassifier {
    fn classify(&self, line: &str, history: &mut StreamHistory) {
        trace!(line, "Classifying Anthropic line");
        match parse_sse_line(line) {
            SseLine::Blank => {
                history.push_chunk(StreamChunk::new(ChunkKind::EmptyLine, line));
            }
            // The event name is repeated in the data payload's `type`
            SseLine::Event(_) => {}
            SseLine::Other => unhandled(line, None, history),
            SseLine::Data(payload) => {
                if let Some(parsed) = parse_payload(line, payload, history) {
                    self.classify_event(line, parsed, history);
                }
            }
        }
    }

    fn classify_completion(&self, body: &str, history: &mut StreamHistory) {
        parser::classify_completion(body, history);
    }
}
