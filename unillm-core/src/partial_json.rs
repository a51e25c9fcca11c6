//! Best-effort recovery of truncated JSON objects
//!
//! While a structured response is still streaming, the accumulated text is a
//! prefix of a JSON object. [`PartialJsonParser::parse`] recovers every
//! top-level key it can see. Values that are not yet complete map to `null`
//! so callers can tell "key seen, value pending" apart from "key absent".
//!
//! A number at the very end of the input is always reported as `null`, even
//! though it parses: `{"n": 4` may still become `{"n": 42}`. The parser has
//! no way to know whether more input is coming.

use serde_json::{Map, Value};

/// Keys recovered from a possibly truncated JSON object, in input order
pub type PartialJsonResult = Map<String, Value>;

/// Decoder for JSON objects that may be cut off mid-stream
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialJsonParser;

impl PartialJsonParser {
    /// Recover as many top-level key/value pairs as possible
    ///
    /// Never panics. Valid JSON objects are returned as-is; anything that is
    /// not an object (or the start of one) yields an empty map.
    pub fn parse(text: &str) -> PartialJsonResult {
        if let Ok(value) = serde_json::from_str::<Value>(text) {
            return match value {
                Value::Object(map) => map,
                _ => Map::new(),
            };
        }

        let trimmed = text.trim();
        let Some(body) = trimmed.strip_prefix('{') else {
            return Map::new();
        };
        let body = body.strip_suffix('}').unwrap_or(body);

        let fragments = split_top_level(body, ',');
        let last = fragments.len().saturating_sub(1);
        let mut result = Map::new();

        for (position, fragment) in fragments.iter().enumerate() {
            if fragment.trim().is_empty() {
                continue;
            }
            let (key_text, value_text) = split_key_value(fragment);
            let Ok(key) = serde_json::from_str::<String>(key_text.trim()) else {
                continue;
            };
            let value = value_text
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .filter(|v| !(position == last && looks_like_bare_number(v)))
                .and_then(|v| serde_json::from_str(v).ok())
                .unwrap_or(Value::Null);
            result.insert(key, value);
        }

        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Default,
    InString,
    Escaped,
}

/// Tracks string/escape state and nesting depth one character at a time
#[derive(Debug)]
struct Scanner {
    state: ScanState,
    braces: usize,
    brackets: usize,
}

impl Scanner {
    fn new() -> Self {
        Self {
            state: ScanState::Default,
            braces: 0,
            brackets: 0,
        }
    }

    /// Outside any string and any nested object or array
    fn at_top_level(&self) -> bool {
        self.state == ScanState::Default && self.braces == 0 && self.brackets == 0
    }

    fn feed(&mut self, c: char) {
        self.state = match (self.state, c) {
            (ScanState::Default, '"') => ScanState::InString,
            (ScanState::Default, '{') => {
                self.braces += 1;
                ScanState::Default
            }
            (ScanState::Default, '}') => {
                self.braces = self.braces.saturating_sub(1);
                ScanState::Default
            }
            (ScanState::Default, '[') => {
                self.brackets += 1;
                ScanState::Default
            }
            (ScanState::Default, ']') => {
                self.brackets = self.brackets.saturating_sub(1);
                ScanState::Default
            }
            (ScanState::Default, _) => ScanState::Default,
            (ScanState::InString, '\\') => ScanState::Escaped,
            (ScanState::InString, '"') => ScanState::Default,
            (ScanState::InString, _) => ScanState::InString,
            (ScanState::Escaped, _) => ScanState::InString,
        };
    }
}

/// Split on every occurrence of `delimiter` outside strings and nesting
fn split_top_level(text: &str, delimiter: char) -> Vec<&str> {
    let mut scanner = Scanner::new();
    let mut parts = Vec::new();
    let mut start = 0;

    for (offset, c) in text.char_indices() {
        if c == delimiter && scanner.at_top_level() {
            parts.push(&text[start..offset]);
            start = offset + c.len_utf8();
            continue;
        }
        scanner.feed(c);
    }
    parts.push(&text[start..]);
    parts
}

/// Split a pair fragment at its first top-level colon
fn split_key_value(fragment: &str) -> (&str, Option<&str>) {
    let mut scanner = Scanner::new();
    for (offset, c) in fragment.char_indices() {
        if c == ':' && scanner.at_top_level() {
            return (&fragment[..offset], Some(&fragment[offset + 1..]));
        }
        scanner.feed(c);
    }
    (fragment, None)
}

/// Optional leading `-`, then digits with at most one `.`
fn looks_like_bare_number(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(text: &str) -> Value {
        Value::Object(PartialJsonParser::parse(text))
    }

    #[test]
    fn test_truncated_string_value_is_null() {
        assert_eq!(parse(r#"{"a": 1, "b": "x"#), json!({"a": 1, "b": null}));
    }

    #[test]
    fn test_valid_json_returned_verbatim() {
        let text = r#"{"name": "Ada", "tags": ["x", "y"], "nested": {"k": [1, 2, {"z": null}]}, "n": 42}"#;
        let expected: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parse(text), expected);
    }

    #[test]
    fn test_valid_json_keeps_key_order() {
        let keys: Vec<String> = PartialJsonParser::parse(r#"{"z": 1, "a": 2, "m": 3}"#)
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_empty_and_garbage() {
        assert!(PartialJsonParser::parse("").is_empty());
        assert!(PartialJsonParser::parse("not json").is_empty());
        assert!(PartialJsonParser::parse("   ").is_empty());
        assert!(PartialJsonParser::parse("[1, 2").is_empty());
    }

    #[test]
    fn test_valid_non_object_is_empty() {
        assert!(PartialJsonParser::parse("42").is_empty());
        assert!(PartialJsonParser::parse("[1, 2]").is_empty());
        assert!(PartialJsonParser::parse("\"text\"").is_empty());
    }

    #[test]
    fn test_trailing_number_is_incomplete() {
        assert_eq!(parse(r#"{"n": 42"#), json!({"n": null}));
        assert_eq!(parse(r#"{"n": -3.5"#), json!({"n": null}));
        assert_eq!(parse(r#"{"a": 1, "n": 7"#), json!({"a": 1, "n": null}));
    }

    #[test]
    fn test_number_followed_by_comma_is_complete() {
        assert_eq!(parse(r#"{"n": 42,"#), json!({"n": 42}));
        assert_eq!(parse(r#"{"n": 42, "#), json!({"n": 42}));
    }

    #[test]
    fn test_trailing_literals_are_not_numbers() {
        assert_eq!(parse(r#"{"ok": true"#), json!({"ok": true}));
        assert_eq!(parse(r#"{"ok": fal"#), json!({"ok": null}));
        assert_eq!(parse(r#"{"s": "done""#), json!({"s": "done"}));
    }

    #[test]
    fn test_nested_values() {
        assert_eq!(
            parse(r#"{"a": {"b": 1, "c": [1, 2]}, "d": [3, "#),
            json!({"a": {"b": 1, "c": [1, 2]}, "d": null})
        );
    }

    #[test]
    fn test_delimiters_inside_strings() {
        assert_eq!(
            parse(r#"{"a": "x, y: z", "b": "q\"uote, here", "c"#),
            json!({"a": "x, y: z", "b": "q\"uote, here"})
        );
    }

    #[test]
    fn test_escaped_backslash_before_quote() {
        assert_eq!(parse(r#"{"path": "C:\\", "next": 1, "x"#), json!({"path": "C:\\", "next": 1, "x": null}));
    }

    #[test]
    fn test_key_without_value() {
        assert_eq!(parse(r#"{"a": 1, "b""#), json!({"a": 1, "b": null}));
        assert_eq!(parse(r#"{"a": 1, "b":"#), json!({"a": 1, "b": null}));
    }

    #[test]
    fn test_incomplete_key_is_dropped() {
        assert_eq!(parse(r#"{"a": "x", "be"#), json!({"a": "x"}));
    }

    #[test]
    fn test_unicode_content() {
        assert_eq!(parse(r#"{"greeting": "héllo, wörld", "emoji": "🦀"#), json!({"greeting": "héllo, wörld", "emoji": null}));
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(parse("  \n{\"a\": \"b\", \"c\": 2"), json!({"a": "b", "c": null}));
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level(r#""a": [1, 2], "b": {"c": 3, "d": 4}, "e""#, ','),
            vec![r#""a": [1, 2]"#, r#" "b": {"c": 3, "d": 4}"#, r#" "e""#]
        );
    }

    #[test]
    fn test_split_key_value() {
        assert_eq!(split_key_value(r#""a:b": "c:d""#), (r#""a:b""#, Some(r#" "c:d""#)));
        assert_eq!(split_key_value(r#""a""#), (r#""a""#, None));
    }

    #[test]
    fn test_looks_like_bare_number() {
        assert!(looks_like_bare_number("42"));
        assert!(looks_like_bare_number("-0.5"));
        assert!(looks_like_bare_number("3."));
        assert!(!looks_like_bare_number("-"));
        assert!(!looks_like_bare_number("1.2.3"));
        assert!(!looks_like_bare_number("1e5"));
        assert!(!looks_like_bare_number("true"));
    }
}
