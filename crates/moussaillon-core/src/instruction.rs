//! Canonical instruction shape shared by every parser, and the planner
//! directive schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Path of the introspection pseudo-resource that lists API roots.
pub const RESOURCES_PATH: &str = "/_resources";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    /// GET and DELETE carry their payload as query parameters.
    pub fn payload_is_query(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated API call ready for the executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInstruction {
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    pub translated_command: String,
}

impl ParsedInstruction {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        let path = normalize_path(&path.into());
        let translated_command = format!("{} {}", method, path);
        Self {
            method,
            path,
            query: None,
            body: None,
            translated_command,
        }
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self.retranslate();
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self.retranslate();
        self
    }

    /// Routes a payload to `query` or `body` depending on the method.
    pub fn with_payload(self, payload: Value) -> Self {
        if self.method.payload_is_query() {
            self.with_query(payload)
        } else {
            self.with_body(payload)
        }
    }

    pub fn list_resources() -> Self {
        Self::new(HttpMethod::Get, RESOURCES_PATH)
    }

    pub fn is_resource_listing(&self) -> bool {
        self.path == RESOURCES_PATH
    }

    fn retranslate(&mut self) {
        let mut command = format!("{} {}", self.method, self.path);
        for payload in [&self.query, &self.body].into_iter().flatten() {
            command.push(' ');
            command.push_str(&payload.to_string());
        }
        self.translated_command = command;
    }
}

/// Ensures the path is non-empty and starts with `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// What the AI planner asked for, once it passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Reply {
        message: String,
    },
    McpCall {
        method: HttpMethod,
        path: String,
        query: Option<Value>,
        body: Option<Value>,
    },
}

#[derive(Debug, Deserialize)]
struct RawDirective {
    action: String,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    method: Option<Value>,
    #[serde(default)]
    path: Option<Value>,
    #[serde(default)]
    query: Option<Value>,
    #[serde(default)]
    body: Option<Value>,
}

impl Directive {
    /// Validates a decoded JSON value against the directive schema.
    ///
    /// Anything that does not conform yields `None`; the caller shows the raw
    /// text instead of acting on it.
    pub fn from_value(value: Value) -> Option<Self> {
        let raw: RawDirective = serde_json::from_value(value).ok()?;
        match raw.action.as_str() {
            "reply" => {
                let message = raw.message?.as_str()?.to_string();
                Some(Directive::Reply { message })
            }
            "mcp_call" => {
                let method = HttpMethod::from_str(raw.method?.as_str()?)?;
                let path = raw.path?.as_str()?.trim().to_string();
                if path.is_empty() {
                    return None;
                }
                Some(Directive::McpCall {
                    method,
                    path: normalize_path(&path),
                    query: raw.query.filter(|v| !v.is_null()),
                    body: raw.body.filter(|v| !v.is_null()),
                })
            }
            _ => None,
        }
    }

    pub fn into_instruction(self) -> Option<ParsedInstruction> {
        match self {
            Directive::Reply { .. } => None,
            Directive::McpCall {
                method,
                path,
                query,
                body,
            } => {
                let mut instruction = ParsedInstruction::new(method, path);
                if let Some(query) = query {
                    instruction = instruction.with_query(query);
                }
                if let Some(body) = body {
                    instruction = instruction.with_body(body);
                }
                Some(instruction)
            }
        }
    }
}
