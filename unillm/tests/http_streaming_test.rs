//! End-to-end tests against a mock HTTP server

use pretty_assertions::assert_eq;
use serde_json::json;
use unillm::providers::{Provider, ProviderConfig};
use unillm::{ChunkKind, Message, ProviderKind, Request, StreamChunk};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> Request {
    Request::builder()
        .message(Message::system("Be brief."))
        .message(Message::user("Say hello"))
        .max_tokens(32)
        .build()
}

fn provider(kind: ProviderKind, server: &MockServer) -> Provider {
    let mut config = ProviderConfig::new(kind).with_base_url(server.uri());
    if kind != ProviderKind::Ollama {
        config = config.with_api_key("test-key");
    }
    Provider::new(config).unwrap()
}

const ANTHROPIC_SSE: &str = "event: message_start\n\
data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"model\":\"claude-3-5-sonnet-latest\",\"usage\":{\"input_tokens\":12,\"output_tokens\":1}}}\n\
\n\
event: content_block_start\n\
data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\
\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n\
\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\" there\"}}\n\
\n\
event: content_block_stop\n\
data: {\"type\":\"content_block_stop\",\"index\":0}\n\
\n\
event: message_delta\n\
data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":3}}\n\
\n\
event: message_stop\n\
data: {\"type\":\"message_stop\"}\n\
\n";

#[test_log::test(tokio::test)]
async fn test_anthropic_sse_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "stream": true,
            "system": "Be brief.",
            "max_tokens": 32
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ANTHROPIC_SSE, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(ProviderKind::Anthropic, &server);
    let mut stream = provider.stream(&request()).await.unwrap();

    let mut texts = Vec::new();
    while let Some(chunks) = stream.advance().await {
        texts.extend(chunks.iter().filter_map(StreamChunk::text).map(str::to_string));
    }
    assert_eq!(texts, vec!["Hello", " there"]);

    let history = stream.into_history();
    assert_eq!(history.full_text(), "Hello there");
    assert!(history.is_finished());
    assert_eq!(history.metadata().stop_reason.as_deref(), Some("end_turn"));
    assert_eq!(history.metadata().usage.map(|u| u.total_tokens()), Some(15));
}

#[test_log::test(tokio::test)]
async fn test_ollama_ndjson_stream() {
    let body = [
        r#"{"model":"llama3.2","message":{"role":"assistant","content":"Hi"},"done":false}"#,
        r#"{"model":"llama3.2","message":{"role":"assistant","content":"!"},"done":false}"#,
        r#"{"model":"llama3.2","message":{"role":"assistant","content":""},"done":true,"done_reason":"stop","prompt_eval_count":8,"eval_count":2}"#,
    ]
    .join("\n");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2",
            "stream": true,
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Say hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let history = provider(ProviderKind::Ollama, &server)
        .stream(&request())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(history.full_text(), "Hi!");
    assert_eq!(
        history.last_chunk().map(StreamChunk::kind),
        Some(ChunkKind::CompletionEnd)
    );
    assert_eq!(history.metadata().model.as_deref(), Some("llama3.2"));
}

#[test_log::test(tokio::test)]
async fn test_openai_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "stream": false,
            "instructions": "Be brief.",
            "max_output_tokens": 32
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_1",
            "object": "response",
            "status": "completed",
            "model": "gpt-4o-mini",
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{"type": "output_text", "text": "Hello!", "annotations": []}]
            }],
            "usage": {"input_tokens": 10, "output_tokens": 2, "total_tokens": 12}
        })))
        .mount(&server)
        .await;

    let history = provider(ProviderKind::OpenAI, &server)
        .complete(&request())
        .await
        .unwrap();

    assert_eq!(history.full_text(), "Hello!");
    assert_eq!(history.chunks().len(), 1);
    assert_eq!(history.chunks()[0].kind(), ChunkKind::CompleteResponse);
    assert_eq!(history.metadata().id.as_deref(), Some("resp_1"));
}

#[test_log::test(tokio::test)]
async fn test_server_error_becomes_http_error_chunk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let provider = provider(ProviderKind::OpenAI, &server);

    let history = provider.stream(&request()).await.unwrap().collect().await;
    assert_eq!(history.chunks().len(), 1);
    let failure = history.failure().unwrap();
    assert_eq!(failure.kind(), ChunkKind::HttpError);
    assert_eq!(failure.error(), Some("HTTP 500: upstream exploded"));

    let history = provider.complete(&request()).await.unwrap();
    assert_eq!(
        history.failure().and_then(StreamChunk::error),
        Some("HTTP 500: upstream exploded")
    );
    assert_eq!(history.full_text(), "");
}

#[test_log::test(tokio::test)]
async fn test_error_event_mid_stream() {
    let body = "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_2\"}}\n\
\n\
data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\
\n";

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let history = provider(ProviderKind::Anthropic, &server)
        .stream(&request())
        .await
        .unwrap()
        .collect()
        .await;

    let failure = history.failure().unwrap();
    assert_eq!(failure.kind(), ChunkKind::FormatError);
    assert_eq!(failure.error(), Some("Overloaded"));
    assert!(!history.is_finished());
}
