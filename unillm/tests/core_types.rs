//! Tests for core types

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use unillm::*;

#[test]
fn test_request_builder() {
    let request = Request::builder()
        .message(Message::system("You are helpful"))
        .message(Message::user("Hello"))
        .model("gpt-4o-mini")
        .temperature(0.8)
        .max_tokens(100)
        .response_schema(json!({"type": "object"}))
        .build();

    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.system_prompt().as_deref(), Some("You are helpful"));
    assert_eq!(request.conversation().count(), 1);
    assert_eq!(request.parameters.temperature, Some(0.8));
    assert_eq!(request.parameters.max_tokens, Some(100));
    assert!(request.response_schema.is_some());
}

#[test]
fn test_partial_json_grows_with_input() {
    let full = r#"{"title": "Dune", "year": 1965, "tags": ["sf", "classic"]}"#;

    let snapshots: Vec<Value> = [20, 35, 45, full.len()]
        .iter()
        .map(|&end| Value::Object(PartialJsonParser::parse(&full[..end])))
        .collect();

    // {"title": "Dune", "y
    assert_eq!(snapshots[0], json!({"title": "Dune"}));
    // {"title": "Dune", "year": 1965, "ta
    assert_eq!(snapshots[1], json!({"title": "Dune", "year": 1965}));
    // {"title": "Dune", "year": 1965, "tags": ["sf"
    assert_eq!(snapshots[2], json!({"title": "Dune", "year": 1965, "tags": null}));
    assert_eq!(
        snapshots[3],
        json!({"title": "Dune", "year": 1965, "tags": ["sf", "classic"]})
    );
}

#[test]
fn test_partial_json_never_panics_on_prefixes() {
    let text = r#"{"a": "x\"y", "b": {"c": [1, {"d": "}"}]}, "e": -2.5, "f": true}"#;
    for end in 0..=text.len() {
        if text.is_char_boundary(end) {
            let _ = PartialJsonParser::parse(&text[..end]);
        }
    }
    assert_eq!(PartialJsonParser::parse(text).len(), 4);
}

#[test]
fn test_history_reconstructs_mixed_blocks() {
    let mut history = StreamHistory::new();
    let blocks = history.content_blocks_mut();
    blocks.start(0, ContentBlock::text(""));
    blocks.start(1, ContentBlock::tool_call("lookup", json!({})));
    blocks.append_text(0, "Let me ");
    blocks.append_tool_json(1, r#"{"q": "#);
    blocks.append_text(0, "check.");
    blocks.append_tool_json(1, r#""rust"}"#);
    assert!(blocks.finish_tool_call(1));

    history.push_chunk(StreamChunk::new(ChunkKind::StreamStop, "data: {}"));

    assert_eq!(history.full_text(), "Let me check.");
    assert_eq!(
        history.tool_calls(),
        vec![ToolCall {
            name: "lookup".into(),
            input: json!({"q": "rust"}),
        }]
    );
    assert!(history.is_finished());
    assert!(history.failure().is_none());
}

#[test]
fn test_structured_falls_back_to_tool_buffer() {
    let mut history = StreamHistory::new();
    let blocks = history.content_blocks_mut();
    blocks.start(0, ContentBlock::tool_call("structured_output", json!({})));
    blocks.append_tool_json(0, r#"{"name": "Ada", "langs": ["#);

    let structured = ContentExtractor::structured(&history);
    assert_eq!(structured.get("name"), Some(&json!("Ada")));
    assert_eq!(structured.get("langs"), Some(&Value::Null));
    assert_eq!(ContentExtractor::extract(&history).text, "");
}

#[test]
fn test_failure_is_only_the_last_chunk() {
    let history = StreamHistory::new()
        .add_chunk(StreamChunk::format_error("{}", json!({}), "event has no type"))
        .add_chunk(StreamChunk::new(ChunkKind::ContentBlockDelta, "{}"));
    assert!(history.failure().is_none());

    let history = history.add_chunk(StreamChunk::http_error("HTTP 502: bad gateway"));
    assert_eq!(history.failure().and_then(StreamChunk::error), Some("HTTP 502: bad gateway"));
}

#[test]
fn test_provider_kind_names() {
    let names: Vec<String> = ProviderKind::ALL.iter().map(ToString::to_string).collect();
    assert_eq!(names.len(), 3);
    assert!(names.iter().all(|name| !name.is_empty()));
}
