//! UI-agnostic conversation state
//!
//! The message log is append-only: messages are never edited or removed for
//! the lifetime of a session. Readiness and turn state are small state
//! machines mutated only through the transitions below.

use serde::{Deserialize, Serialize};

/// A chat message in the operator conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Outcome of the `initialize` handshake.
///
/// Only gates a status indicator; sending is allowed in every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    #[default]
    Idle,
    Initializing,
    Ready,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    Sending,
}

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    readiness: Readiness,
    turn: TurnState,
    warned: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: content.into(),
        });
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    pub fn is_loading(&self) -> bool {
        self.turn == TurnState::Sending
    }

    /// `Idle -> Initializing`. Returns false if a handshake already ran.
    pub fn begin_initialize(&mut self) -> bool {
        if self.readiness != Readiness::Idle {
            return false;
        }
        self.readiness = Readiness::Initializing;
        true
    }

    pub fn finish_initialize(&mut self, ready: bool) {
        if self.readiness == Readiness::Initializing {
            self.readiness = if ready {
                Readiness::Ready
            } else {
                Readiness::Degraded
            };
        }
    }

    /// Appends the handshake warning at most once per session.
    pub fn warn_once(&mut self, content: impl Into<String>) {
        if !self.warned {
            self.warned = true;
            self.push_assistant(content);
        }
    }

    /// `Idle -> Sending`. Returns false when a turn is already in flight.
    pub fn begin_turn(&mut self) -> bool {
        if self.turn == TurnState::Sending {
            return false;
        }
        self.turn = TurnState::Sending;
        true
    }

    pub fn end_turn(&mut self) {
        self.turn = TurnState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_runs_once() {
        let mut conversation = Conversation::new();
        assert!(conversation.begin_initialize());
        conversation.finish_initialize(false);
        assert_eq!(conversation.readiness(), Readiness::Degraded);
        assert!(!conversation.begin_initialize());
        conversation.finish_initialize(true);
        assert_eq!(conversation.readiness(), Readiness::Degraded);
    }

    #[test]
    fn turn_refuses_reentry() {
        let mut conversation = Conversation::new();
        assert!(conversation.begin_turn());
        assert!(conversation.is_loading());
        assert!(!conversation.begin_turn());
        conversation.end_turn();
        assert!(!conversation.is_loading());
    }

    #[test]
    fn warning_is_appended_once() {
        let mut conversation = Conversation::new();
        conversation.warn_once("first");
        conversation.warn_once("second");
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].content, "first");
    }
}
