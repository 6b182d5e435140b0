use std::time::Duration;

use {async_trait::async_trait, tracing::debug};

use crate::{ChatProvider, ChatRequest, ChatResponse, ProviderError, route::local_model_name};

const PROVIDER: &str = "ollama";

/// Context window passed to the local runtime.
const NUM_CTX: u32 = 8192;

/// Locally hosted Ollama backend. Single-turn: only the last message forms
/// the prompt.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { base_url, client }
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let model = local_model_name(&req.model);
        debug!(model, "calling ollama");

        let body = serde_json::json!({
            "model": model,
            "prompt": req.last_content(),
            "stream": false,
            "options": {
                "temperature": req.temperature,
                "num_predict": req.max_tokens,
                "num_ctx": NUM_CTX,
            },
        });

        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
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

        let content = envelope["response"]
            .as_str()
            .ok_or_else(|| ProviderError::Backend {
                provider: PROVIDER,
                status: Some(status.as_u16()),
                message: "response missing 'response' field".into(),
            })?
            .to_string();

        Ok(ChatResponse {
            content,
            provider: PROVIDER,
            tokens_used: envelope["eval_count"].as_u64(),
        })
    }
}
