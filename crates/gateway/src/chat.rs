//! Chat completion endpoint.
//!
//! The handler validates, then hands the provider call to the worker pool
//! and waits with the request deadline. Saturation is reported before any
//! provider work starts, so an overloaded gateway sheds load in
//! microseconds instead of tying up a connection.

use std::sync::Arc;

use {
    axum::{Json, extract::State},
    serde_json::{Value, json},
    tracing::debug,
};

use portico_providers::{ChatRequest, ChatResponse};

use crate::{error::ApiError, state::AppState};

pub async fn chat_completion(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, ApiError> {
    debug!(model = %request.model, messages = request.messages.len(), "chat request admitted");
    let model = request.model.clone();
    let response = run_offloaded(&state, request).await?;
    Ok(Json(envelope(&model, &response)))
}

/// Validate, hand off to the pool, and wait within the request deadline.
/// Shared with the code endpoints, which build their own `ChatRequest`.
pub(crate) async fn run_offloaded(
    state: &AppState,
    request: ChatRequest,
) -> Result<ChatResponse, ApiError> {
    request.validate()?;
    let providers = Arc::clone(&state.gateway.providers);
    let handle = state
        .gateway
        .pool
        .submit(async move { providers.complete(&request).await })?;
    Ok(handle.join_within(state.gateway.request_deadline).await??)
}

/// OpenAI-style response envelope.
fn envelope(model: &str, response: &ChatResponse) -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": response.content,
            }
        }],
        "model": model,
        "provider": response.provider,
        "usage": response.tokens_used.map(|total| json!({ "total_tokens": total })),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_content_and_usage() {
        let value = envelope(
            "deepseek-chat",
            &ChatResponse {
                content: "hi there".into(),
                provider: "deepseek",
                tokens_used: Some(42),
            },
        );
        assert_eq!(value["choices"][0]["message"]["content"], "hi there");
        assert_eq!(value["choices"][0]["message"]["role"], "assistant");
        assert_eq!(value["model"], "deepseek-chat");
        assert_eq!(value["usage"]["total_tokens"], 42);
    }

    #[test]
    fn envelope_without_usage_is_null() {
        let value = envelope(
            "ollama-llama2",
            &ChatResponse {
                content: "ok".into(),
                provider: "ollama",
                tokens_used: None,
            },
        );
        assert!(value["usage"].is_null());
    }
}
