//! Turns a canonical instruction into one MCP tool call.

use crate::error::Result;
use crate::instruction::ParsedInstruction;
use crate::mcp::{McpTransport, CALL_API_RESOURCE_TOOL, LIST_API_RESOURCES_TOOL};
use crate::resources::RouteTable;
use crate::state::Conversation;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

pub struct InstructionExecutor<T> {
    transport: Arc<T>,
    routes: RouteTable,
}

impl<T: McpTransport> InstructionExecutor<T> {
    pub fn new(transport: Arc<T>, routes: RouteTable) -> Self {
        Self { transport, routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Runs the instruction and appends its result to the conversation.
    ///
    /// Returns the console route to show next, if the path maps to one.
    /// Transport failures are returned untouched; nothing is retried.
    pub async fn execute(
        &self,
        instruction: &ParsedInstruction,
        conversation: &mut Conversation,
    ) -> Result<Option<String>> {
        let result = if instruction.is_resource_listing() {
            info!(tool = LIST_API_RESOURCES_TOOL, "executing");
            self.transport
                .call_tool(LIST_API_RESOURCES_TOOL, json!({}))
                .await?
        } else {
            info!(tool = CALL_API_RESOURCE_TOOL, command = %instruction.translated_command, "executing");
            self.transport
                .call_tool(CALL_API_RESOURCE_TOOL, tool_arguments(instruction))
                .await?
        };

        conversation.push_assistant(result_text(&result));

        if result.get("isError").and_then(Value::as_bool) == Some(true) {
            warn!(path = %instruction.path, "api call reported an error");
            return Ok(None);
        }
        Ok(self.routes.destination(&instruction.path).map(str::to_string))
    }
}

/// Arguments for the generic resource tool, field for field.
pub fn tool_arguments(instruction: &ParsedInstruction) -> Value {
    let mut arguments = Map::new();
    arguments.insert("method".to_string(), json!(instruction.method.as_str()));
    arguments.insert("path".to_string(), json!(instruction.path));
    if let Some(query) = &instruction.query {
        arguments.insert("query".to_string(), query.clone());
    }
    if let Some(body) = &instruction.body {
        arguments.insert("body".to_string(), body.clone());
    }
    Value::Object(arguments)
}

/// First textual content item of a tool result, else the whole result.
pub fn result_text(result: &Value) -> String {
    result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|items| {
            items.iter().find_map(|item| {
                let textual = item
                    .get("type")
                    .and_then(Value::as_str)
                    .map_or(true, |kind| kind == "text");
                item.get("text").and_then(Value::as_str).filter(|_| textual)
            })
        })
        .map(str::to_string)
        .unwrap_or_else(|| serde_json::to_string_pretty(result).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::instruction::HttpMethod;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<(String, Value)>>,
        result: Option<Value>,
    }

    #[async_trait]
    impl McpTransport for RecordingTransport {
        async fn call(&self, method: &str, params: Value) -> Result<Value> {
            self.calls.lock().unwrap().push((method.to_string(), params));
            self.result.clone().ok_or(ChatError::Transport {
                status: Some(500),
                message: String::new(),
            })
        }
    }

    fn text_result(text: &str) -> Value {
        json!({"content": [{"type": "text", "text": text}], "isError": false})
    }

    #[tokio::test]
    async fn tool_payload_mirrors_instruction() {
        let transport = Arc::new(RecordingTransport {
            result: Some(text_result("{\"status\":201}")),
            ..Default::default()
        });
        let executor = InstructionExecutor::new(transport.clone(), RouteTable::default());
        let instruction = ParsedInstruction::new(HttpMethod::Post, "/clients")
            .with_body(json!({"nom": "Dupont", "tags": [1, 2]}));
        let mut conversation = Conversation::new();

        let destination = executor.execute(&instruction, &mut conversation).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "tools/call");
        assert_eq!(
            calls[0].1,
            json!({
                "name": CALL_API_RESOURCE_TOOL,
                "arguments": {"method": "POST", "path": "/clients", "body": {"nom": "Dupont", "tags": [1, 2]}}
            })
        );
        assert_eq!(destination.as_deref(), Some("/clients"));
        assert_eq!(conversation.last().unwrap().content, "{\"status\":201}");
    }

    #[tokio::test]
    async fn resource_listing_uses_introspection_tool() {
        let transport = Arc::new(RecordingTransport {
            result: Some(text_result("{\"resources\":[\"/clients\"]}")),
            ..Default::default()
        });
        let executor = InstructionExecutor::new(transport.clone(), RouteTable::default());
        let mut conversation = Conversation::new();

        let destination = executor
            .execute(&ParsedInstruction::list_resources(), &mut conversation)
            .await
            .unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].1, json!({"name": LIST_API_RESOURCES_TOOL, "arguments": {}}));
        assert!(destination.is_none());
    }

    #[tokio::test]
    async fn failures_propagate_without_appending() {
        let transport = Arc::new(RecordingTransport::default());
        let executor = InstructionExecutor::new(transport.clone(), RouteTable::default());
        let mut conversation = Conversation::new();

        let err = executor
            .execute(&ParsedInstruction::new(HttpMethod::Get, "/ventes"), &mut conversation)
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Transport { status: Some(500), .. }));
        assert!(conversation.messages().is_empty());
        assert_eq!(transport.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn api_errors_do_not_navigate() {
        let transport = Arc::new(RecordingTransport {
            result: Some(json!({"content": [{"type": "text", "text": "{\"status\":404}"}], "isError": true})),
            ..Default::default()
        });
        let executor = InstructionExecutor::new(transport, RouteTable::default());
        let mut conversation = Conversation::new();

        let destination = executor
            .execute(&ParsedInstruction::new(HttpMethod::Get, "/clients/99"), &mut conversation)
            .await
            .unwrap();
        assert!(destination.is_none());
        assert_eq!(conversation.last().unwrap().content, "{\"status\":404}");
    }

    #[test]
    fn query_only_arguments() {
        let instruction = ParsedInstruction::new(HttpMethod::Get, "/clients/search")
            .with_query(json!({"q": "dupont"}));
        assert_eq!(
            tool_arguments(&instruction),
            json!({"method": "GET", "path": "/clients/search", "query": {"q": "dupont"}})
        );
    }

    #[test]
    fn result_without_text_is_pretty_printed() {
        let result = json!({"content": [{"type": "image", "data": "..."}]});
        assert_eq!(result_text(&result), serde_json::to_string_pretty(&result).unwrap());
        assert_eq!(result_text(&json!({"content": [{"text": "brut"}]})), "brut");
    }
}
