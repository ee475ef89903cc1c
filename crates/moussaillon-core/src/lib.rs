pub mod ai;
pub mod config;
pub mod error;
pub mod executor;
pub mod instruction;
pub mod json_scan;
pub mod mcp;
pub mod parser;
pub mod provider;
pub mod resolver;
pub mod resources;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{AiChat, BackendChatClient};
pub use config::Config;
pub use error::{ChatError, Result};
pub use executor::InstructionExecutor;
pub use instruction::{Directive, HttpMethod, ParsedInstruction};
pub use mcp::{McpClient, McpTransport};
pub use provider::Provider;
pub use resolver::{CommandResolver, Resolution, HELP_TEXT};
pub use resources::{ResourceCatalog, RouteTable};
pub use session::{ChatSession, Navigator, SessionSettings, TurnOutcome};
pub use state::{ChatMessage, ChatRole, Conversation, Readiness};
