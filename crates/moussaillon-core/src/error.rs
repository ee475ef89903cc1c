//! Error kinds surfaced by a chat turn.
//!
//! Every variant ends up as a single `Erreur: ...` assistant message; the
//! `Display` text is what the operator reads.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The RPC channel answered with a non-2xx status or could not be reached.
    #[error("{}", transport_message(.status, .message))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The JSON-RPC envelope carried an `error` member.
    #[error("{}", rpc_message(.message, .data))]
    Rpc {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("{0}")]
    AiUnavailable(String),

    /// Malformed JSON in a command the operator clearly meant to write.
    #[error("{0}")]
    InstructionSyntax(String),

    #[error("{0}")]
    UnresolvedCommand(String),
}

impl ChatError {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::InstructionSyntax(message.into())
    }
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match *status {
        Some(status) if message.is_empty() => format!("appel MCP échoué (HTTP {})", status),
        Some(status) => format!("appel MCP échoué (HTTP {}): {}", status, message),
        None => format!("serveur MCP injoignable: {}", message),
    }
}

fn rpc_message(message: &str, data: &Option<serde_json::Value>) -> String {
    match data {
        Some(data) => format!("{} {}", message, data).trim().to_string(),
        None => message.to_string(),
    }
}
