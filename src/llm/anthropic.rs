use anthropic_ai_sdk::client::AnthropicClient;
use anthropic_ai_sdk::types::message::{
    ContentBlock, CreateMessageParams, CreateMessageResponse, Message, MessageClient, MessageError,
    RequiredMessageParams, Role,
};
use async_trait::async_trait;

use crate::error::ProviderError;
use crate::llm::{ChatMessage, ChatModel};

#[derive(Debug, Clone)]
/// Runtime configuration for [`AnthropicModel`].
pub struct AnthropicModelConfig {
    /// Anthropic API key.
    pub api_key: String,
    /// Model id (for example `claude-sonnet-4-5`).
    pub model: String,
    /// Anthropic API version header value.
    pub api_version: String,
    /// Optional base URL override for proxies or compatible endpoints.
    pub api_base_url: Option<String>,
    /// Maximum output tokens per call.
    pub max_tokens: u32,
    /// Sampling temperature. Defaults low so refinement runs stay stable.
    pub temperature: Option<f32>,
}

impl AnthropicModelConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            api_version: AnthropicClient::DEFAULT_API_VERSION.to_string(),
            api_base_url: None,
            max_tokens: 4096,
            temperature: Some(0.1),
        }
    }
}

#[derive(Debug, Clone)]
/// Anthropic provider adapter implementing [`ChatModel`].
pub struct AnthropicModel {
    client: AnthropicClient,
    config: AnthropicModelConfig,
}

impl AnthropicModel {
    pub fn new(config: AnthropicModelConfig) -> Result<Self, ProviderError> {
        let mut builder =
            AnthropicClient::builder(config.api_key.clone(), config.api_version.clone());
        if let Some(url) = &config.api_base_url {
            builder = builder.with_api_base_url(url.clone());
        }

        let client = builder
            .build::<MessageError>()
            .map_err(|err| ProviderError::Request(err.to_string()))?;

        Ok(Self { client, config })
    }

    /// Creates a model adapter using `ANTHROPIC_API_KEY` from the environment.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ProviderError::Request("ANTHROPIC_API_KEY is not set".to_string()))?;
        Self::new(AnthropicModelConfig::new(api_key, model))
    }
}

#[async_trait]
impl ChatModel for AnthropicModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let (history, system) = to_anthropic_messages(messages);

        let required = RequiredMessageParams {
            model: self.config.model.clone(),
            messages: history,
            max_tokens: self.config.max_tokens,
        };

        let mut request = CreateMessageParams::new(required).with_stream(false);

        if let Some(system_prompt) = system {
            request = request.with_system(system_prompt);
        }

        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        let response = self
            .client
            .create_message(Some(&request))
            .await
            .map_err(|err| ProviderError::Request(err.to_string()))?;

        extract_text(&response)
    }
}

fn to_anthropic_messages(messages: &[ChatMessage]) -> (Vec<Message>, Option<String>) {
    let mut system_lines = Vec::new();
    let mut anthropic_messages = Vec::new();

    for message in messages {
        match message {
            ChatMessage::System(content) => system_lines.push(content.clone()),
            ChatMessage::User(content) => {
                anthropic_messages.push(Message::new_text(Role::User, content.clone()));
            }
            ChatMessage::Assistant(content) => {
                anthropic_messages.push(Message::new_text(Role::Assistant, content.clone()));
            }
        }
    }

    let system = if system_lines.is_empty() {
        None
    } else {
        Some(system_lines.join("\n\n"))
    };

    (anthropic_messages, system)
}

fn extract_text(response: &CreateMessageResponse) -> Result<String, ProviderError> {
    let mut text_parts = Vec::new();

    for block in &response.content {
        if let ContentBlock::Text { text } = block {
            text_parts.push(text.clone());
        }
    }

    if text_parts.is_empty() {
        return Err(ProviderError::Response(
            "completion contained no text blocks".to_string(),
        ));
    }

    Ok(text_parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use anthropic_ai_sdk::types::message::StopReason;

    use super::*;

    fn text_response(blocks: Vec<ContentBlock>) -> CreateMessageResponse {
        CreateMessageResponse {
            content: blocks,
            id: "msg_1".to_string(),
            model: "claude-test".to_string(),
            role: Role::Assistant,
            stop_reason: Some(StopReason::EndTurn),
            stop_sequence: None,
            type_: "message".to_string(),
            usage: anthropic_ai_sdk::types::message::Usage {
                input_tokens: 1,
                output_tokens: 1,
            },
        }
    }

    #[test]
    fn to_anthropic_messages_splits_out_system_prompt() {
        let messages = vec![
            ChatMessage::System("you are a reviewer".to_string()),
            ChatMessage::User("task".to_string()),
            ChatMessage::Assistant("draft".to_string()),
        ];

        let (converted, system) = to_anthropic_messages(&messages);
        assert_eq!(system.as_deref(), Some("you are a reviewer"));
        assert_eq!(converted.len(), 2);
    }

    #[test]
    fn extract_text_joins_text_blocks() {
        let response = text_response(vec![
            ContentBlock::Text {
                text: "part one".to_string(),
            },
            ContentBlock::Text {
                text: "part two".to_string(),
            },
        ]);

        let text = extract_text(&response).expect("has text");
        assert_eq!(text, "part one\npart two");
    }

    #[test]
    fn extract_text_rejects_textless_completion() {
        let response = text_response(vec![]);
        let err = extract_text(&response).expect_err("must fail");
        assert!(matches!(err, ProviderError::Response(_)));
    }
}
