use serde::{Deserialize, Serialize};

/// Access token minted by the provider for a single authorization code.
///
/// Lives only for the duration of the exchange; it is handed to the session
/// issuer for embedding and never persisted on its own.
#[derive(Debug, Clone)]
pub struct ProviderToken {
    pub access_token: String,
}

/// Who the provider says the token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The provider answered the token endpoint but returned no access
    /// token. Carries the raw provider body for diagnostics.
    #[error("token exchange rejected: {payload}")]
    Exchange { payload: String },

    /// The user-info endpoint returned a non-success status.
    #[error("identity lookup failed with status {status}")]
    IdentityLookup { status: u16 },

    /// An upstream call exceeded its deadline. Distinct from rejection so
    /// callers can decide whether a retry makes sense.
    #[error("upstream call timed out")]
    Timeout,

    /// Connection-level failure (DNS, TLS, refused, ...).
    #[error("upstream transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for OAuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}
