/// Failure classes a provider call can surface. Timeout is deliberately
/// separate from a backend-reported failure so callers can tell "slow" from
/// "broken".
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unsupported model '{model}'")]
    UnsupportedModel { model: String },

    #[error("{provider} call exceeded its deadline")]
    Timeout { provider: &'static str },

    #[error("{provider} backend error{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Backend {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("{provider} is not configured (missing API key)")]
    NotConfigured { provider: &'static str },
}

impl ProviderError {
    /// The provider that failed, when routing got that far.
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedModel { .. } => None,
            Self::Timeout { provider }
            | Self::Backend { provider, .. }
            | Self::NotConfigured { provider } => Some(provider),
        }
    }

    /// Classify a transport-level error from a provider call.
    pub(crate) fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { provider }
        } else {
            Self::Backend {
                provider,
                status: err.status().map(|s| s.as_u16()),
                // reqwest errors don't embed credentials; safe to pass on.
                message: err.to_string(),
            }
        }
    }
}
