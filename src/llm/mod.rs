mod anthropic;

use async_trait::async_trait;

use crate::error::ProviderError;

pub use anthropic::{AnthropicModel, AnthropicModelConfig};

/// A chat message as seen by a hosted model backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant(String),
}

/// Minimal chat-completion surface the role backends drive.
///
/// Transport, authentication, and retry policy all live behind this trait;
/// the loop core never sees them.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;
}
