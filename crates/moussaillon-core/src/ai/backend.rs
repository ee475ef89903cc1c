use super::{reply, AiChat};
use crate::error::{ChatError, Result};
use crate::provider::Provider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Serialize)]
struct ChatRequest<'a> {
    provider: &'a str,
    message: &'a str,
}

/// Client for the backend `/ai/chat` relay, which forwards to the provider.
#[derive(Clone)]
pub struct BackendChatClient {
    client: Client,
    endpoint: String,
}

impl BackendChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/ai/chat", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AiChat for BackendChatClient {
    async fn chat(&self, provider: Provider, message: &str) -> Result<String> {
        let request = ChatRequest {
            provider: provider.as_str(),
            message,
        };
        debug!(provider = provider.as_str(), endpoint = %self.endpoint, "ai chat");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::AiUnavailable(format!("service IA injoignable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            warn!(status, provider = provider.as_str(), "ai chat failed");
            return Err(ChatError::AiUnavailable(reply::error_text(status, &text)));
        }

        // unreadable bodies count as an empty answer
        let body = response.text().await.unwrap_or_default();
        Ok(reply::extract_text(&body))
    }
}
