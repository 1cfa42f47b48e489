//! Completion provider abstraction.
//!
//! The server talks to the completion API through the [`Provider`] trait so
//! that tests can substitute a mock for the real OpenAI client.

mod openai;

pub use openai::OpenAIProvider;

use crate::session::Message;
use async_trait::async_trait;

/// Unified interface for chat completion providers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Send a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// A chat completion request. No temperature, token-limit, or other
/// generation parameters are set; the provider's defaults apply.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChatRequest {
    /// Model to use
    pub model: String,
    /// Messages in the conversation, system prompt first
    pub messages: Vec<Message>,
}

/// A chat completion response.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChatResponse {
    /// Model that produced the reply
    pub model: String,
    /// Reply content from the first choice
    pub content: String,
}

/// Error from a provider.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub provider: String,
    pub message: String,
    pub status_code: Option<u16>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.provider, self.message)
    }
}

impl std::error::Error for ProviderError {}
