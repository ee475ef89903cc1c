//! Locating JSON objects embedded in free text.
//!
//! Parsing starts at a `{` and reads exactly one JSON value with serde's
//! streaming deserializer, so nested braces and braces inside strings are
//! balanced by the JSON grammar itself and trailing prose is ignored.

use regex::Regex;
use serde_json::{Deserializer, Value};
use std::sync::OnceLock;

/// Result of looking for an embedded object.
#[derive(Debug)]
pub enum Embedded {
    /// No `{` in the text.
    Absent,
    /// A `{` was found but what follows is not valid JSON.
    Invalid(serde_json::Error),
    Found(Value),
}

/// Byte offset of the first `{`, which also marks the end of the command
/// part of a natural-language instruction.
pub fn first_brace(text: &str) -> Option<usize> {
    text.find('{')
}

/// First syntactically valid JSON value starting at the first `{`.
pub fn object_at_first_brace(text: &str) -> Embedded {
    match first_brace(text) {
        None => Embedded::Absent,
        Some(start) => match value_at(text, start) {
            Ok(value) => Embedded::Found(value),
            Err(e) => Embedded::Invalid(e),
        },
    }
}

/// First `{` position, scanning left to right, at which a JSON object parses.
pub fn first_object(text: &str) -> Option<Value> {
    text.match_indices('{')
        .find_map(|(start, _)| value_at(text, start).ok())
}

/// Contents of the first fenced code block, with or without a `json` tag.
pub fn fenced_block(text: &str) -> Option<&str> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").ok())
        .as_ref()?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn value_at(text: &str, start: usize) -> Result<Value, serde_json::Error> {
    let mut stream = Deserializer::from_str(&text[start..]).into_iter::<Value>();
    match stream.next() {
        Some(result) => result,
        None => serde_json::from_str::<Value>(""),
    }
}
