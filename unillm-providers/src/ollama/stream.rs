//! Ollama NDJSON stream classification

use crate::ollama::converter::{OllamaChatResponse, OllamaStreamMessage};
use crate::ollama::parser;
use crate::stream_utils::{
    decode_event, error_message, format_error, parse_payload, record_usage,
};
use crate::traits::StreamClassifier;
use serde_json::{json, Value};
use tracing::trace;
use unillm_core::{ChunkKind, ContentBlock, StreamChunk, StreamHistory};

/// Classifier for Ollama NDJSON streams
#[derive(Debug, Clone, Copy, Default)]
pub struct OllamaClassifier;

/// Check the common shape of a line or body, returning the decoded response
pub(crate) fn decode_response(
    raw: &str,
    history: &mut StreamHistory,
) -> Option<(Value, OllamaChatResponse)> {
    let parsed = parse_payload(raw, raw, history)?;
    if let Some(error) = parsed.get("error").filter(|e| !e.is_null()) {
        let message = error_message(error);
        format_error(raw, parsed, message, history);
        return None;
    }
    let response = decode_event::<OllamaChatResponse>(raw, &parsed, history)?;
    if response.message.is_none() && !response.done {
        format_error(raw, parsed, "chunk has no message", history);
        return None;
    }
    if response.model.is_some() && history.metadata().model.is_none() {
        history.metadata_mut().model = response.model.clone();
    }
    Some((parsed, response))
}

/// Record a message's tool calls, then its text
///
/// Each tool call becomes a complete block at the next free index. Text goes
/// to the one text block of the response, which is created on first use.
pub(crate) fn apply_message(
    raw: &str,
    parsed: &Value,
    message: OllamaStreamMessage,
    history: &mut StreamHistory,
) {
    if !message.tool_calls.is_empty() {
        for call in message.tool_calls {
            let entry = json!({
                "name": call.function.name.clone(),
                "arguments": call.function.arguments.clone(),
            });
            let arguments = entry["arguments"].to_string();
            history.content_blocks_mut().push(call.into_block());
            history.push_chunk(
                StreamChunk::new(ChunkKind::ToolCallDelta, raw)
                    .with_parsed(entry)
                    .with_text(arguments),
            );
        }
        history.push_chunk(
            StreamChunk::new(ChunkKind::ToolCallStop, raw).with_parsed(parsed.clone()),
        );
    }

    if !message.content.is_empty() {
        let blocks = history.content_blocks_mut();
        let index = match blocks.last_text_index() {
            Some(index) => index,
            None => blocks.push(ContentBlock::text("")),
        };
        blocks.append_text(index, &message.content);
        history.push_chunk(
            StreamChunk::new(ChunkKind::ContentBlockDelta, raw)
                .with_parsed(parsed.clone())
                .with_text(message.content),
        );
    }
}

/// Record the final line's stop reason and token counts
pub(crate) fn apply_done(response: &OllamaChatResponse, history: &mut StreamHistory) {
    if response.done_reason.is_some() {
        history.metadata_mut().stop_reason = response.done_reason.clone();
    }
    record_usage(history, response.prompt_eval_count, response.eval_count);
}

impl StreamClassifier for OllamaClassifier {
    fn classify(&self, line: &str, history: &mut StreamHistory) {
        trace!(line, "Classifying Ollama line");
        if line.trim().is_empty() {
            history.push_chunk(StreamChunk::new(ChunkKind::EmptyLine, line));
            return;
        }
        let Some((parsed, mut response)) = decode_response(line, history) else {
            return;
        };

        if let Some(message) = response.message.take() {
            apply_message(line, &parsed, message, history);
        }
        if response.done {
            apply_done(&response, history);
            history.push_chunk(StreamChunk::new(ChunkKind::CompletionEnd, line).with_parsed(parsed));
        }
    }

    fn classify_completion(&self, body: &str, history: &mut StreamHistory) {
        parser::classify_completion(body, history);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn replay(lines: &[&str]) -> StreamHistory {
        let mut history = StreamHistory::new();
        for line in lines {
            OllamaClassifier.classify(line, &mut history);
        }
        history
    }

    fn kinds(history: &StreamHistory) -> Vec<ChunkKind> {
        history.chunks().iter().map(StreamChunk::kind).collect()
    }

    #[test]
    fn test_text_transcript() {
        let history = replay(&[
            r#"{"model":"llama3.2","created_at":"2024-07-01T12:00:00Z","message":{"role":"assistant","content":"The"},"done":false}"#,
            r#"{"model":"llama3.2","created_at":"2024-07-01T12:00:00Z","message":{"role":"assistant","content":" sky"},"done":false}"#,
            r#"{"model":"llama3.2","created_at":"2024-07-01T12:00:00Z","message":{"role":"assistant","content":" is blue."},"done":false}"#,
            r#"{"model":"llama3.2","created_at":"2024-07-01T12:00:01Z","message":{"role":"assistant","content":""},"done":true,"done_reason":"stop","total_duration":4883583458,"prompt_eval_count":26,"eval_count":4}"#,
        ]);

        assert_eq!(history.full_text(), "The sky is blue.");
        assert_eq!(history.content_blocks().len(), 1);
        assert_eq!(
            kinds(&history),
            vec![
                ChunkKind::ContentBlockDelta,
                ChunkKind::ContentBlockDelta,
                ChunkKind::ContentBlockDelta,
                ChunkKind::CompletionEnd,
            ]
        );
        let metadata = history.metadata();
        assert_eq!(metadata.model.as_deref(), Some("llama3.2"));
        assert_eq!(metadata.stop_reason.as_deref(), Some("stop"));
        assert_eq!(metadata.usage.map(|u| u.total_tokens()), Some(30));
        assert!(history.is_finished());
    }

    #[test]
    fn test_large_token_counts() {
        let history = replay(&[r#"{"done":true,"prompt_eval_count":4294967295,"eval_count":5}"#]);

        let usage = history.metadata().usage.unwrap();
        assert_eq!(usage.prompt_tokens, u32::MAX);
        assert_eq!(usage.total_tokens(), 4_294_967_300);
        assert!(history.is_finished());
    }

    #[test]
    fn test_tool_chunks_come_before_content() {
        let history = replay(&[
            r#"{"model":"llama3.2","message":{"role":"assistant","content":"Checking","tool_calls":[{"function":{"name":"get_weather","arguments":{"city":"Toronto"}}},{"function":{"name":"get_time","arguments":{"tz":"EST"}}}]},"done":false}"#,
        ]);

        assert_eq!(
            kinds(&history),
            vec![
                ChunkKind::ToolCallDelta,
                ChunkKind::ToolCallDelta,
                ChunkKind::ToolCallStop,
                ChunkKind::ContentBlockDelta,
            ]
        );

        let blocks: Vec<(usize, &ContentBlock)> = history.content_blocks().iter().collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].1.is_tool_call());
        assert!(blocks[1].1.is_tool_call());
        assert_eq!(blocks[2], (2, &ContentBlock::text("Checking")));

        let calls = history.tool_calls();
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].input, json!({"city": "Toronto"}));
        assert_eq!(history.chunks()[0].text(), Some("{\"city\":\"Toronto\"}"));
    }

    #[test]
    fn test_text_after_tool_call_reuses_text_block() {
        let history = replay(&[
            r#"{"message":{"content":"A"},"done":false}"#,
            r#"{"message":{"content":"","tool_calls":[{"function":{"name":"t","arguments":{}}}]},"done":false}"#,
            r#"{"message":{"content":"B"},"done":false}"#,
        ]);
        assert_eq!(history.full_text(), "AB");
        assert_eq!(history.content_blocks().len(), 2);
    }

    #[test]
    fn test_errors() {
        let history = replay(&[
            "",
            "{\"message\":",
            r#"{"done":false}"#,
            r#"{"error":"model 'nope' not found"}"#,
        ]);

        assert_eq!(
            kinds(&history),
            vec![
                ChunkKind::EmptyLine,
                ChunkKind::ParseError,
                ChunkKind::FormatError,
                ChunkKind::FormatError,
            ]
        );
        assert_eq!(
            history.last_chunk().and_then(StreamChunk::error),
            Some("model 'nope' not found")
        );
    }

    #[test]
    fn test_done_without_message() {
        let history = replay(&[r#"{"model":"llama3.2","done":true,"done_reason":"length"}"#]);
        assert_eq!(kinds(&history), vec![ChunkKind::CompletionEnd]);
        assert_eq!(history.metadata().stop_reason.as_deref(), Some("length"));
    }
}
