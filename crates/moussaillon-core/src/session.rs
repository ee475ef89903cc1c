//! One operator chat session: handshake, turns, and the message log.
//!
//! A turn runs to completion before the next one is accepted. Every failure
//! inside a turn becomes a single `Erreur: ...` assistant message.

use crate::ai::{AiChat, BackendChatClient};
use crate::config::Config;
use crate::error::Result;
use crate::executor::InstructionExecutor;
use crate::mcp::{McpClient, McpTransport};
use crate::provider::Provider;
use crate::resolver::{CommandResolver, Resolution};
use crate::resources::{ResourceCatalog, RouteTable};
use crate::state::{ChatMessage, Conversation, Readiness};
use std::sync::Arc;
use tracing::{info, warn};

/// Receives the console route computed after a successful call.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &str);
}

#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub provider: Provider,
    pub catalog: ResourceCatalog,
    pub routes: RouteTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The assistant message appended for this turn.
    pub reply: String,
    pub destination: Option<String>,
    pub failed: bool,
}

pub struct ChatSession<T, A> {
    transport: Arc<T>,
    resolver: CommandResolver<A>,
    executor: InstructionExecutor<T>,
    conversation: Conversation,
    navigator: Option<Box<dyn Navigator>>,
}

impl ChatSession<McpClient, BackendChatClient> {
    /// Session talking to the backend described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let base_url = config.base_url();
        Self::new(
            Arc::new(McpClient::new(&base_url)),
            BackendChatClient::new(&base_url),
            config.session_settings(),
        )
    }

    pub async fn list_tools(&self) -> Result<Vec<serde_json::Value>> {
        self.transport.list_tools().await
    }
}

impl<T: McpTransport, A: AiChat> ChatSession<T, A> {
    pub fn new(transport: Arc<T>, ai: A, settings: SessionSettings) -> Self {
        Self {
            executor: InstructionExecutor::new(transport.clone(), settings.routes),
            resolver: CommandResolver::new(ai, settings.provider, settings.catalog),
            transport,
            conversation: Conversation::new(),
            navigator: None,
        }
    }

    pub fn with_navigator(mut self, navigator: impl Navigator + 'static) -> Self {
        self.navigator = Some(Box::new(navigator));
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    pub fn readiness(&self) -> Readiness {
        self.conversation.readiness()
    }

    pub fn is_ready(&self) -> bool {
        self.conversation.is_ready()
    }

    pub fn is_loading(&self) -> bool {
        self.conversation.is_loading()
    }

    pub fn provider(&self) -> Provider {
        self.resolver.provider()
    }

    pub fn set_provider(&mut self, provider: Provider) {
        self.resolver.set_provider(provider);
    }

    /// Runs the `initialize` handshake once.
    ///
    /// A failure only marks the session degraded and leaves a warning in the
    /// log; later turns are still attempted.
    pub async fn initialize(&mut self) -> Readiness {
        if !self.conversation.begin_initialize() {
            return self.conversation.readiness();
        }

        match self.transport.initialize().await {
            Ok(_) => {
                info!("mcp session ready");
                self.conversation.finish_initialize(true);
            }
            Err(e) => {
                warn!(error = %e, "mcp initialize failed");
                self.conversation.finish_initialize(false);
                self.conversation.warn_once(format!(
                    "Attention: connexion MCP non initialisée ({}). Les commandes risquent d'échouer.",
                    e
                ));
            }
        }
        self.conversation.readiness()
    }

    /// Submits one operator input.
    ///
    /// Returns `None` when the input is blank or a turn is already running.
    pub async fn submit(&mut self, input: &str) -> Option<TurnOutcome> {
        let text = input.trim();
        if text.is_empty() || !self.conversation.begin_turn() {
            return None;
        }
        self.conversation.push_user(text);

        let outcome = match self.run_turn(text).await {
            Ok(destination) => TurnOutcome {
                reply: self
                    .conversation
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default(),
                destination,
                failed: false,
            },
            Err(e) => {
                let reply = format!("Erreur: {}", e);
                self.conversation.push_assistant(reply.clone());
                TurnOutcome {
                    reply,
                    destination: None,
                    failed: true,
                }
            }
        };

        if let (Some(navigator), Some(destination)) = (&self.navigator, &outcome.destination) {
            navigator.navigate(destination);
        }
        self.conversation.end_turn();
        Some(outcome)
    }

    /// Resolves without executing or touching the log.
    pub async fn dry_run(&self, input: &str) -> Result<Resolution> {
        self.resolver.resolve(input).await
    }

    async fn run_turn(&mut self, text: &str) -> Result<Option<String>> {
        match self.resolver.resolve(text).await? {
            Resolution::Reply(reply) => {
                self.conversation.push_assistant(reply);
                Ok(None)
            }
            Resolution::Execute(instruction) => {
                self.executor
                    .execute(&instruction, &mut self.conversation)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::mcp::CALL_API_RESOURCE_TOOL;
    use crate::state::ChatRole;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<(String, Value)>>,
        fail_initialize: bool,
    }

    #[async_trait]
    impl McpTransport for FakeBackend {
        async fn call(&self, method: &str, params: Value) -> Result<Value> {
            self.calls.lock().unwrap().push((method.to_string(), params.clone()));
            match method {
                "initialize" if self.fail_initialize => Err(ChatError::Transport {
                    status: Some(503),
                    message: String::new(),
                }),
                "initialize" => Ok(json!({"protocolVersion": "2024-11-05"})),
                "tools/call" if params["arguments"]["path"] == "/ventes" => Err(ChatError::Rpc {
                    code: -32602,
                    message: "Path not allowed".to_string(),
                    data: None,
                }),
                _ => Ok(json!({"content": [{"type": "text", "text": "ok"}], "isError": false})),
            }
        }
    }

    struct FixedAi(&'static str);

    #[async_trait]
    impl AiChat for FixedAi {
        async fn chat(&self, _provider: Provider, _message: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNavigator(Arc<Mutex<Vec<String>>>);

    impl Navigator for RecordingNavigator {
        fn navigate(&self, destination: &str) {
            self.0.lock().unwrap().push(destination.to_string());
        }
    }

    fn session(backend: FakeBackend, ai: &'static str) -> (Arc<FakeBackend>, ChatSession<FakeBackend, FixedAi>) {
        let backend = Arc::new(backend);
        let session = ChatSession::new(backend.clone(), FixedAi(ai), SessionSettings::default());
        (backend, session)
    }

    #[tokio::test]
    async fn handshake_success_marks_ready() {
        let (_, mut session) = session(FakeBackend::default(), "");
        assert_eq!(session.initialize().await, Readiness::Ready);
        assert!(session.is_ready());
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn handshake_failure_warns_once_and_still_sends() {
        let (backend, mut session) = session(
            FakeBackend {
                fail_initialize: true,
                ..Default::default()
            },
            "",
        );
        assert_eq!(session.initialize().await, Readiness::Degraded);
        assert_eq!(session.initialize().await, Readiness::Degraded);
        assert_eq!(session.messages().len(), 1);
        assert!(session.messages()[0].content.contains("HTTP 503"));

        let outcome = session.submit("liste les clients").await.unwrap();
        assert!(!outcome.failed);
        assert_eq!(backend.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn executed_turn_appends_and_navigates() {
        let navigator = RecordingNavigator::default();
        let (backend, session) = session(FakeBackend::default(), "");
        let mut session = session.with_navigator(navigator.clone());

        let outcome = session.submit("supprime le client 12").await.unwrap();

        assert_eq!(outcome.reply, "ok");
        assert_eq!(outcome.destination.as_deref(), Some("/clients"));
        assert_eq!(navigator.0.lock().unwrap().as_slice(), ["/clients".to_string()]);
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].1["name"], CALL_API_RESOURCE_TOOL);
        assert_eq!(calls[0].1["arguments"], json!({"method": "DELETE", "path": "/clients/12"}));
        let roles: Vec<ChatRole> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, [ChatRole::User, ChatRole::Assistant]);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn planner_reply_makes_no_transport_call() {
        let (backend, mut session) = session(FakeBackend::default(), r#"{"action":"reply","message":"bonjour"}"#);
        let outcome = session.submit("salut").await.unwrap();
        assert_eq!(outcome.reply, "bonjour");
        assert!(outcome.destination.is_none());
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn planner_call_makes_exactly_one_transport_call() {
        let (backend, mut session) = session(
            FakeBackend::default(),
            r#"{"action":"mcp_call","method":"GET","path":"/clients"}"#,
        );
        session.submit("qui sont nos gens ?").await.unwrap();
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1["arguments"], json!({"method": "GET", "path": "/clients"}));
    }

    #[tokio::test]
    async fn errors_become_prefixed_messages() {
        let (_, mut session) = session(FakeBackend::default(), "");

        let syntax = session.submit("crée un client").await.unwrap();
        assert!(syntax.failed);
        assert!(syntax.reply.starts_with("Erreur: "));

        let rpc = session.submit("GET /ventes").await.unwrap();
        assert_eq!(rpc.reply, "Erreur: Path not allowed");

        assert_eq!(session.messages().len(), 4);
        assert_eq!(session.messages()[3].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let (_, mut session) = session(FakeBackend::default(), "");
        assert!(session.submit("   ").await.is_none());
        assert!(session.messages().is_empty());
    }
}
