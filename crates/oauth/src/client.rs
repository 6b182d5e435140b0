use std::time::Duration;

use tracing::{debug, warn};

use crate::types::{Identity, OAuthError, ProviderToken};

/// Default network timeout for both upstream calls.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

const OAUTH_SCOPES: &str = "repo,user,write:repo_hook";

/// Upstream endpoint set, injectable so tests can point at a local server.
#[derive(Debug, Clone)]
pub struct OAuthEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub user_url: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: "https://github.com/login/oauth/authorize".into(),
            token_url: "https://github.com/login/oauth/access_token".into(),
            user_url: "https://api.github.com/user".into(),
        }
    }
}

/// Client for the GitHub OAuth web flow: build the authorize URL, exchange
/// the callback code for a token, look up the identity behind it.
pub struct GithubOAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    setup_url: Option<String>,
    endpoints: OAuthEndpoints,
    http: reqwest::Client,
}

impl GithubOAuthClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        setup_url: Option<String>,
    ) -> Self {
        Self::with_endpoints(
            client_id,
            client_secret,
            redirect_uri,
            setup_url,
            OAuthEndpoints::default(),
            UPSTREAM_TIMEOUT,
        )
    }

    pub fn with_endpoints(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        setup_url: Option<String>,
        endpoints: OAuthEndpoints,
        timeout: Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            setup_url,
            endpoints,
            http,
        }
    }

    /// Build the provider authorization URL. With `setup_redirect` the post
    /// -install setup page replaces the normal callback target.
    pub fn authorize_url(&self, setup_redirect: bool) -> String {
        let redirect = match (&self.setup_url, setup_redirect) {
            (Some(setup), true) => setup.as_str(),
            _ => self.redirect_uri.as_str(),
        };
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}",
            self.endpoints.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect),
            urlencoding::encode(OAUTH_SCOPES),
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// One outbound call; a body without `access_token` means the provider
    /// rejected the code and the raw payload is preserved for diagnostics.
    pub async fn exchange(&self, code: &str) -> Result<ProviderToken, OAuthError> {
        debug!("exchanging authorization code");
        let resp = self
            .http
            .post(&self.endpoints.token_url)
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "client_id": self.client_id,
                "client_secret": self.client_secret,
                "code": code,
                "redirect_uri": self.redirect_uri,
            }))
            .send()
            .await?;

        let body: serde_json::Value = resp.json().await?;
        match body.get("access_token").and_then(|v| v.as_str()) {
            Some(token) => Ok(ProviderToken {
                access_token: token.to_string(),
            }),
            None => {
                warn!("token endpoint returned no access token");
                Err(OAuthError::Exchange {
                    payload: body.to_string(),
                })
            },
        }
    }

    /// Fetch the identity an access token represents.
    pub async fn fetch_identity(&self, token: &ProviderToken) -> Result<Identity, OAuthError> {
        let resp = self
            .http
            .get(&self.endpoints.user_url)
            .header("Authorization", format!("Bearer {}", token.access_token))
            // GitHub's API rejects requests without a User-Agent.
            .header("User-Agent", "portico")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OAuthError::IdentityLookup {
                status: status.as_u16(),
            });
        }

        let user: serde_json::Value = resp.json().await?;
        let id = user
            .get("id")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| OAuthError::IdentityLookup {
                status: status.as_u16(),
            })?;
        let login = user
            .get("login")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let email = user
            .get("email")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Identity { id, login, email })
    }
}
