/// Pure routing decision from a model id. `resolve` never falls back to a
/// default provider — sending content to an unintended backend is worse
/// than failing the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRoute {
    /// Hosted DeepSeek chat API.
    Deepseek,
    /// Locally hosted Ollama model, named by stripping the `ollama-` prefix.
    Ollama { model: String },
}

impl ProviderRoute {
    pub fn resolve(model_id: &str) -> Option<Self> {
        if model_id == "deepseek-chat" {
            return Some(Self::Deepseek);
        }
        if let Some(local) = model_id.strip_prefix("ollama-")
            && !local.is_empty()
        {
            return Some(Self::Ollama {
                model: local.to_string(),
            });
        }
        None
    }
}

/// The backend-local model name for an `ollama-*` id.
pub(crate) fn local_model_name(model_id: &str) -> &str {
    model_id.strip_prefix("ollama-").unwrap_or(model_id)
}
