use std::time::Duration;

use {async_trait::async_trait, tracing::debug};

use crate::{ChatProvider, ChatRequest, ChatResponse, ProviderError};

const PROVIDER: &str = "deepseek";

/// Hosted DeepSeek chat-completion backend (OpenAI-shaped envelope).
pub struct DeepseekProvider {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl DeepseekProvider {
    /// Without an API key the provider stays registered but every call
    /// fails with [`ProviderError::NotConfigured`].
    pub fn new(api_key: Option<String>, base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            api_key,
            base_url,
            client,
        }
    }
}

#[async_trait]
impl ChatProvider for DeepseekProvider {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::NotConfigured { provider: PROVIDER });
        };

        debug!(model = %req.model, "calling deepseek");
        let body = serde_json::json!({
            "model": req.model,
            "messages": req.messages,
            "temperature": req.temperature,
            "max_tokens": req.max_tokens,
            "stream": false,
        });

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Backend {
                provider: PROVIDER,
                status: Some(status.as_u16()),
                message,
            });
        }

        let envelope: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, e))?;

        let content = envelope["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ProviderError::Backend {
                provider: PROVIDER,
                status: Some(status.as_u16()),
                message: "response missing choices[0].message.content".into(),
            })?
            .to_string();

        Ok(ChatResponse {
            content,
            provider: PROVIDER,
            tokens_used: envelope["usage"]["total_tokens"].as_u64(),
        })
    }
}
