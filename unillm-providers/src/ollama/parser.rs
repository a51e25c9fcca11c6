//! Ollama non-streaming response parsing

use crate::ollama::stream::{apply_done, apply_message, decode_response};
use unillm_core::{ChunkKind, StreamChunk, StreamHistory};

/// Materialize a complete chat body into `history`
pub(crate) fn classify_completion(body: &str, history: &mut StreamHistory) {
    let Some((parsed, mut response)) = decode_response(body, history) else {
        return;
    };
    if let Some(message) = response.message.take() {
        apply_message(body, &parsed, message, history);
    }
    apply_done(&response, history);
    history.push_chunk(StreamChunk::new(ChunkKind::CompleteResponse, body).with_parsed(parsed));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use unillm_core::ContentBlock;

    #[test]
    fn test_complete_body() {
        let body = json!({
            "model": "llama3.2",
            "created_at": "2024-07-01T12:00:00Z",
            "message": {
                "role": "assistant",
                "content": "{\"name\": \"Ada\"}",
                "tool_calls": [{"function": {"name": "log", "arguments": {"level": "info"}}}]
            },
            "done": true,
            "done_reason": "stop",
            "prompt_eval_count": 12,
            "eval_count": 7
        })
        .to_string();

        let mut history = StreamHistory::new();
        classify_completion(&body, &mut history);

        assert_eq!(history.full_text(), "{\"name\": \"Ada\"}");
        assert_eq!(
            history.content_blocks().get(0),
            Some(&ContentBlock::ToolCall {
                name: "log".into(),
                input: json!({"level": "info"}),
                input_json_buffer: "{\"level\":\"info\"}".into(),
            })
        );
        assert_eq!(history.last_chunk().map(StreamChunk::kind), Some(ChunkKind::CompleteResponse));
        assert_eq!(history.metadata().usage.map(|u| u.completion_tokens), Some(7));
    }

    #[test]
    fn test_error_body() {
        let mut history = StreamHistory::new();
        classify_completion(r#"{"error":"model requires more system memory"}"#, &mut history);
        assert_eq!(
            history.failure().and_then(StreamChunk::error),
            Some("model requires more system memory")
        );
    }
}
