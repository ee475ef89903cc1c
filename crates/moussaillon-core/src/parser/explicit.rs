//! `METHOD /path [json]` syntax.

use crate::error::{ChatError, Result};
use crate::instruction::{HttpMethod, ParsedInstruction};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?is)^\s*(GET|POST|PUT|DELETE)\s+(\S+)(?:\s+(.+?))?\s*$").ok())
        .as_ref()
}

/// Parses explicit API syntax.
///
/// The payload goes to `query` for GET/DELETE and to `body` for POST/PUT. A
/// payload that is not valid JSON is an error, not a fall-through.
pub fn parse_explicit(input: &str) -> Result<Option<ParsedInstruction>> {
    let Some(caps) = pattern().and_then(|re| re.captures(input)) else {
        return Ok(None);
    };
    let Some(method) = caps.get(1).and_then(|m| HttpMethod::from_str(m.as_str())) else {
        return Ok(None);
    };
    let Some(path) = caps.get(2) else {
        return Ok(None);
    };

    let instruction = ParsedInstruction::new(method, path.as_str());
    match caps.get(3) {
        None => Ok(Some(instruction)),
        Some(payload) => {
            let payload: Value = serde_json::from_str(payload.as_str()).map_err(|e| {
                let target = if method.payload_is_query() { "query" } else { "body" };
                ChatError::syntax(format!("JSON {} invalide: {}", target, e))
            })?;
            Ok(Some(instruction.with_payload(payload)))
        }
    }
}
