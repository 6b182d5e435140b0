//! Chat-completion provider gateway.
//!
//! Providers are a closed set resolved by exhaustive match on the request's
//! model id — an unknown id fails fast, never silently falling back to a
//! default backend. Each provider makes exactly one network call with its
//! own timeout (hosted APIs answer fast, local models do not) and
//! normalizes the backend's envelope into [`ChatResponse`]. No retries
//! happen here; that is the caller's decision.

pub mod deepseek;
mod error;
pub mod ollama;
mod route;
mod types;

use async_trait::async_trait;

pub use {
    deepseek::DeepseekProvider,
    error::ProviderError,
    ollama::OllamaProvider,
    route::ProviderRoute,
    types::{ChatMessage, ChatRequest, ChatResponse, InvalidChatRequest},
};

/// A chat-completion backend. One implementation per provider; each call is
/// a single network round trip.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn id(&self) -> &'static str;

    async fn complete(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// Routes chat requests to the provider their model id names.
///
/// Holds one instance of every known provider, built once at startup; the
/// routing table is read-only after construction.
pub struct ProviderGateway {
    deepseek: DeepseekProvider,
    ollama: OllamaProvider,
}

impl ProviderGateway {
    pub fn new(deepseek: DeepseekProvider, ollama: OllamaProvider) -> Self {
        Self { deepseek, ollama }
    }

    /// Route `req` to exactly one provider. An unroutable model id returns
    /// [`ProviderError::UnsupportedModel`] without touching the network.
    pub async fn complete(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        match ProviderRoute::resolve(&req.model) {
            Some(ProviderRoute::Deepseek) => self.deepseek.complete(req).await,
            Some(ProviderRoute::Ollama { .. }) => self.ollama.complete(req).await,
            None => Err(ProviderError::UnsupportedModel {
                model: req.model.clone(),
            }),
        }
    }
}
