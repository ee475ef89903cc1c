pub mod backend;
pub mod reply;

pub use backend::BackendChatClient;
pub use reply::extract_text;

use crate::error::Result;
use crate::provider::Provider;
use async_trait::async_trait;

/// An external reasoning service reachable through a provider identity.
#[async_trait]
pub trait AiChat: Send + Sync {
    /// Sends one message and returns displayable text.
    async fn chat(&self, provider: Provider, message: &str) -> Result<String>;
}
