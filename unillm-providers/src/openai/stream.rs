//! OpenAI stream classification

use crate::openai::converter::{ContentPart, OutputItem, StreamEvent};
use crate::openai::parser;
use crate::stream_utils::{
    decode_event, error_message, format_error, parse_payload, parse_sse_line, record_usage,
    unhandled, untyped_event, SseLine,
};
use crate::traits::StreamClassifier;
use serde_json::Value;
use tracing::trace;
use unillm_core::types::content::empty_input;
use unillm_core::{ChunkKind, ContentBlock, StreamChunk, StreamHistory};

const DONE_SENTINEL: &str = "[DONE]";

/// Classifier for OpenAI Responses API SSE streams
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAIClassifier;

impl OpenAIClassifier {
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
            StreamEvent::Created { response } => {
                let metadata = history.metadata_mut();
                metadata.id = response.id;
                metadata.model = response.model;
                history.push_chunk(chunk(ChunkKind::StreamStart, parsed));
            }
            StreamEvent::ContentPartAdded { output_index, part } => match part {
                ContentPart::OutputText { text } => {
                    history
                        .content_blocks_mut()
                        .start(output_index, ContentBlock::text(text));
                    history.push_chunk(chunk(ChunkKind::ContentBlockStart, parsed));
                }
                ContentPart::ToolUse { .. } | ContentPart::Unknown => {
                    unhandled(line, Some(parsed), history)
                }
            },
            StreamEvent::OutputTextDelta {
                output_index,
                delta,
            } => {
                history.content_blocks_mut().append_text(output_index, &delta);
                history.push_chunk(chunk(ChunkKind::ContentBlockDelta, parsed).with_text(delta));
            }
            StreamEvent::OutputItemAdded { output_index, item } => match item {
                OutputItem::FunctionCall { name, .. } => {
                    history
                        .content_blocks_mut()
                        .start(output_index, ContentBlock::tool_call(name, empty_input()));
                    history.push_chunk(chunk(ChunkKind::ToolCallStart, parsed));
                }
                OutputItem::Message { .. } | OutputItem::Unknown => {
                    unhandled(line, Some(parsed), history)
                }
            },
            StreamEvent::ArgumentsDelta {
                output_index,
                delta,
            } => {
                history
                    .content_blocks_mut()
                    .append_tool_json(output_index, &delta);
                history.push_chunk(chunk(ChunkKind::ToolCallDelta, parsed).with_text(delta));
            }
            StreamEvent::ArgumentsDone { output_index } => {
                if !history.content_blocks_mut().finish_tool_call(output_index) {
                    trace!(output_index, "Tool arguments did not parse; input left empty");
                }
                history.push_chunk(chunk(ChunkKind::ToolCallStop, parsed));
            }
            StreamEvent::TextDone => {
                history.push_chunk(chunk(ChunkKind::ContentBlockStop, parsed));
            }
            StreamEvent::Completed { response } => {
                if let Some(response) = response {
                    if response.status.is_some() {
                        history.metadata_mut().stop_reason = response.status;
                    }
                    if let Some(usage) = response.usage {
                        record_usage(history, usage.input_tokens, usage.output_tokens);
                    }
                }
                history.push_chunk(chunk(ChunkKind::StreamStop, parsed));
            }
            StreamEvent::Failed => {
                let message = parsed
                    .pointer("/response/error")
                    .filter(|e| !e.is_null())
                    .or_else(|| parsed.get("message"))
                    .map(error_message)
                    .unwrap_or_else(|| "response failed".to_string());
                format_error(line, parsed, message, history);
            }
            StreamEvent::Unknown => unhandled(line, Some(parsed), history),
        }
    }
}

impl StreamClassifier for OpenAIClassifier {
    fn classify(&self, line: &str, history: &mut StreamHistory) {
        trace!(line, "Classifying OpenAI line");
        match parse_sse_line(line) {
            SseLine::Blank => {
                history.push_chunk(StreamChunk::new(ChunkKind::EmptyLine, line));
            }
            SseLine::Event(_) => {}
            SseLine::Other => unhandled(line, None, history),
            SseLine::Data(payload) if payload.trim() == DONE_SENTINEL => {
                history.push_chunk(StreamChunk::new(ChunkKind::StreamStop, line));
            }
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
