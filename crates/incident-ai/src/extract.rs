//! Response text extraction
//!
//! The endpoint is assumed to answer like a chat-completion API but other
//! shapes are tolerated. Probes, in order:
//! 1. `choices[0].message.content` (a string, or text parts)
//! 2. `choices[0].text`
//! 3. top-level `content`
//! 4. top-level `result`
//!
//! Only non-empty strings count. When nothing matches, the whole body is
//! returned as 2-space pretty-printed JSON.

use serde_json::Value;

/// Extract the processed text from a response body
#[must_use]
pub fn extract_text(body: &Value) -> String {
    let choice = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first());

    choice
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(content_text)
        .or_else(|| choice.and_then(|c| c.get("text")).and_then(non_empty))
        .or_else(|| body.get("content").and_then(non_empty))
        .or_else(|| body.get("result").and_then(non_empty))
        .unwrap_or_else(|| serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string()))
}

fn non_empty(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::Array(parts) => {
            let text = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>();
            (!text.is_empty()).then_some(text)
        }
        other => non_empty(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn chat_completion_message() {
        let body = json!({"choices": [{"message": {"content": "X"}}]});
        assert_eq!(extract_text(&body), "X");
    }

    #[test]
    fn legacy_completion_text() {
        let body = json!({"choices": [{"text": "T"}]});
        assert_eq!(extract_text(&body), "T");
    }

    #[test]
    fn content_parts_are_joined() {
        let body = json!({"choices": [{"message": {"content": [
            {"type": "text", "text": "Hello, "},
            {"type": "text", "text": "world"}
        ]}}]});
        assert_eq!(extract_text(&body), "Hello, world");
    }

    #[test]
    fn top_level_content_then_result() {
        assert_eq!(extract_text(&json!({"content": "C", "result": "R"})), "C");
        assert_eq!(extract_text(&json!({"result": "Y"})), "Y");
    }

    #[test]
    fn empty_choices_fall_through() {
        assert_eq!(extract_text(&json!({"choices": [], "result": "Y"})), "Y");
        assert_eq!(
            extract_text(&json!({"choices": [{"message": {"content": ""}}], "content": "C"})),
            "C"
        );
    }

    #[test]
    fn unknown_shape_is_pretty_printed() {
        assert_eq!(extract_text(&json!({"foo": 1})), "{\n  \"foo\": 1\n}");
    }

    proptest! {
        #[test]
        fn message_content_wins_when_present(
            content in ".{1,40}",
            other in ".{0,40}",
        ) {
            let body = json!({
                "choices": [{"message": {"content": &content}, "text": &other}],
                "content": &other,
                "result": &other,
            });
            prop_assert_eq!(extract_text(&body), content);
        }
    }
}
