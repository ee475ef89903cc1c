//! Normalization of the reply shapes the AI relay can return.

use serde_json::Value;

/// Turns a raw response body into displayable text.
///
/// Plain-text bodies are returned verbatim. JSON bodies are probed in order:
/// `answer`, `message`, a `content` array of parts, then
/// `choices[0].message.content`. Anything else is pretty-printed.
pub fn extract_text(body: &str) -> String {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return body.to_string(),
    };

    if let Some(text) = parsed.as_str() {
        return text.to_string();
    }
    if let Some(answer) = parsed.get("answer").and_then(Value::as_str) {
        return answer.to_string();
    }
    if let Some(message) = parsed.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    if let Some(text) = parsed.get("content").and_then(content_parts) {
        return text;
    }
    if let Some(content) = parsed
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        return content.to_string();
    }

    serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| body.to_string())
}

fn content_parts(content: &Value) -> Option<String> {
    let parts: Vec<&str> = content
        .as_array()?
        .iter()
        .filter_map(|part| match part {
            Value::String(text) => Some(text.as_str()),
            other => other.get("text").and_then(Value::as_str),
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Operator-facing text for a failed relay call.
///
/// Prefers the server's own message (JSON `message` or the plain body), else
/// a generic notice keyed by status.
pub fn error_text(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("service IA indisponible (HTTP {})", status);
    }
    match serde_json::from_str::<Value>(body) {
        Ok(parsed) => parsed
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}
