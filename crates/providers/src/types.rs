use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// An inbound chat-completion request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(alias = "maxTokens", default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    "deepseek-chat".into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4000
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidChatRequest {
    #[error("messages must not be empty")]
    EmptyMessages,
    #[error("temperature must be within [0, 1]")]
    TemperatureOutOfRange,
    #[error("maxTokens must be greater than zero")]
    ZeroMaxTokens,
}

impl ChatRequest {
    /// Check the request invariants before any routing happens.
    pub fn validate(&self) -> Result<(), InvalidChatRequest> {
        if self.messages.is_empty() {
            return Err(InvalidChatRequest::EmptyMessages);
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(InvalidChatRequest::TemperatureOutOfRange);
        }
        if self.max_tokens == 0 {
            return Err(InvalidChatRequest::ZeroMaxTokens);
        }
        Ok(())
    }

    /// The effective prompt for single-turn backends: the last message wins.
    pub fn last_content(&self) -> &str {
        self.messages.last().map(|m| m.content.as_str()).unwrap_or("")
    }

    /// Single user message helper, used widely in tests.
    pub fn user_message(model: &str, content: &str) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "user".into(),
                content: content.into(),
            }],
            model: model.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Normalized completion result, identical in shape for every backend.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub content: String,
    pub provider: &'static str,
    pub tokens_used: Option<u64>,
}
