//! JSON-RPC client for the backend `/mcp` endpoint.

use crate::error::{ChatError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Generic "call an API resource" tool, taking `{method, path, query?, body?}`.
pub const CALL_API_RESOURCE_TOOL: &str = "moussaillon_call_api_resource";
/// Introspection tool listing the API root resources, taking `{}`.
pub const LIST_API_RESOURCES_TOOL: &str = "moussaillon_list_api_resources";

#[derive(Debug, Serialize)]
struct McpRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct McpResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<McpError>,
}

#[derive(Debug, Deserialize)]
struct McpError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Request/response channel that can run JSON-RPC methods.
#[async_trait]
pub trait McpTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value>;

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        self.call("tools/call", json!({ "name": name, "arguments": arguments }))
            .await
    }

    /// The one-time handshake performed at session start.
    async fn initialize(&self) -> Result<Value> {
        self.call(
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": "moussaillon-cli",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
        .await
    }
}

pub struct McpClient {
    client: Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl McpClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/mcp", base_url.trim_end_matches('/')),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn list_tools(&self) -> Result<Vec<Value>> {
        let result = self.call("tools/list", json!({})).await?;
        Ok(result
            .get("tools")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }

    fn fresh_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl McpTransport for McpClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let request = McpRequest {
            jsonrpc: "2.0",
            id: self.fresh_id(),
            method,
            params,
        };
        debug!(id = request.id, method, endpoint = %self.endpoint, "mcp call");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(unreachable_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::Transport {
                status: Some(status),
                message: text.trim().to_string(),
            });
        }

        let body = response.text().await.map_err(unreachable_error)?;
        decode_response(&body)
    }
}

fn unreachable_error(e: reqwest::Error) -> ChatError {
    ChatError::Transport {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}

/// Decodes an inbound envelope into its `result`.
///
/// An envelope with neither `result` nor `error` counts as an error with an
/// empty message rather than a silent success.
pub fn decode_response(body: &str) -> Result<Value> {
    let response: McpResponse = serde_json::from_str(body).map_err(|e| ChatError::Rpc {
        code: -32700,
        message: format!("réponse MCP illisible: {}", e),
        data: None,
    })?;

    if let Some(error) = response.error {
        return Err(ChatError::Rpc {
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }

    match response.result {
        Some(result) if !result.is_null() => Ok(result),
        _ => Err(ChatError::Rpc {
            code: 0,
            message: String::new(),
            data: None,
        }),
    }
}
