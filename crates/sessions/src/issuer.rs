use {
    chrono::{Duration, Utc},
    jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode},
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use portico_oauth::Identity;

/// Fixed credential lifetime.
pub const DEFAULT_TTL_DAYS: i64 = 7;

/// Claims embedded in the signed credential.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: u64,
    username: String,
    #[serde(default)]
    email: Option<String>,
    github_token: String,
    iat: i64,
    exp: i64,
}

/// A verified, still-valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub provider_token: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Signature mismatch, garbage input, or unexpected algorithm. The
    /// distinction only matters for logs; callers must treat every variant
    /// the same as a missing credential.
    #[error("invalid session credential")]
    Invalid,
    #[error("session credential expired")]
    Expired,
    #[error("failed to sign session credential: {0}")]
    Signing(String),
}

/// Issues and verifies signed session credentials with a symmetric key.
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(signing_secret: &str) -> Self {
        Self::with_ttl_days(signing_secret, DEFAULT_TTL_DAYS)
    }

    pub fn with_ttl_days(signing_secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(signing_secret.as_bytes()),
            decoding: DecodingKey::from_secret(signing_secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Package a verified identity and its provider token into a signed
    /// credential expiring exactly `ttl` from now.
    pub fn issue(&self, identity: &Identity, provider_token: &str) -> Result<String, SessionError> {
        let issued_at = Utc::now().timestamp();
        let claims = Claims {
            sub: identity.id,
            username: identity.login.clone(),
            email: identity.email.clone(),
            github_token: provider_token.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl.num_seconds(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Verify a credential, rejecting on any defect. Expiry is checked with
    /// zero leeway: a credential one second past `exp` is dead.
    pub fn verify(&self, credential: &str) -> Result<Session, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(credential, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "session credential rejected");
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid,
            }
        })?;

        let claims = data.claims;
        Ok(Session {
            identity: Identity {
                id: claims.sub,
                login: claims.username,
                email: claims.email,
            },
            provider_token: claims.github_token,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
