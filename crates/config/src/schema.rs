//! Config schema: OAuth app credentials, webhook secret, session signing
//! secret, provider backends, and worker pool bounds.

use {secrecy::SecretString, serde::Deserialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PorticoConfig {
    pub oauth: OAuthSettings,
    pub webhook: WebhookSettings,
    pub session: SessionSettings,
    pub providers: ProviderSettings,
    pub pool: PoolSettings,
}

/// GitHub OAuth app settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub redirect_uri: Option<String>,
    /// Alternate redirect target used after app installation.
    pub setup_url: Option<String>,
}

/// Inbound webhook settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    pub secret: Option<SecretString>,
    /// Log the caller IP when a signature check fails.
    pub log_source_ip: bool,
}

/// Session credential settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub secret: Option<SecretString>,
    pub ttl_days: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            secret: None,
            ttl_days: 7,
        }
    }
}

/// Chat-completion backend settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub deepseek: DeepseekSettings,
    pub ollama: OllamaSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeepseekSettings {
    /// Without a key the provider is registered as unconfigured and every
    /// call to it fails with a provider error, matching the hosted backend
    /// being switched off.
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for DeepseekSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepseek.com".into(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub base_url: String,
    /// Local models are slower to first byte than hosted APIs.
    pub timeout_secs: u64,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: "http://ollama:11434".into(),
            timeout_secs: 120,
        }
    }
}

/// Worker pool bounds for offloaded provider calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub workers: usize,
    pub queue: usize,
    /// Outer deadline a chat request may spend in the pool, covering both
    /// queue wait and the provider call itself.
    pub request_deadline_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            workers: 8,
            queue: 32,
            request_deadline_secs: 180,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", keys.join(", "))]
    MissingRequired { keys: Vec<&'static str> },
}

impl PorticoConfig {
    /// Overlay environment variables onto the loaded file config.
    /// Env always wins; secrets typically arrive only this way.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("GITHUB_CLIENT_ID") {
            self.oauth.client_id = Some(v);
        }
        if let Ok(v) = std::env::var("GITHUB_CLIENT_SECRET") {
            self.oauth.client_secret = Some(SecretString::new(v));
        }
        if let Ok(v) = std::env::var("GITHUB_REDIRECT_URI") {
            self.oauth.redirect_uri = Some(v);
        }
        if let Ok(v) = std::env::var("GITHUB_SETUP_URL") {
            self.oauth.setup_url = Some(v);
        }
        if let Ok(v) = std::env::var("GITHUB_WEBHOOK_SECRET") {
            self.webhook.secret = Some(SecretString::new(v));
        }
        if let Ok(v) = std::env::var("SESSION_SECRET") {
            self.session.secret = Some(SecretString::new(v));
        }
        if let Ok(v) = std::env::var("DEEPSEEK_API_KEY") {
            self.providers.deepseek.api_key = Some(SecretString::new(v));
        }
        if let Ok(v) = std::env::var("DEEPSEEK_BASE_URL") {
            self.providers.deepseek.base_url = v;
        }
        if let Ok(v) = std::env::var("OLLAMA_BASE_URL") {
            self.providers.ollama.base_url = v;
        }
        if let Ok(v) = std::env::var("PORTICO_POOL_WORKERS")
            && let Ok(n) = v.parse()
        {
            self.pool.workers = n;
        }
        if let Ok(v) = std::env::var("PORTICO_POOL_QUEUE")
            && let Ok(n) = v.parse()
        {
            self.pool.queue = n;
        }
        if let Ok(v) = std::env::var("PORTICO_REQUEST_DEADLINE_SECS")
            && let Ok(n) = v.parse()
        {
            self.pool.request_deadline_secs = n;
        }
        if let Ok(v) = std::env::var("PORTICO_WEBHOOK_LOG_SOURCE_IP") {
            self.webhook.log_source_ip = matches!(v.as_str(), "1" | "true" | "yes");
        }
    }

    /// Check that every required input is present, reporting all missing
    /// keys at once rather than the first one found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.oauth.client_id.is_none() {
            missing.push("GITHUB_CLIENT_ID");
        }
        if self.oauth.client_secret.is_none() {
            missing.push("GITHUB_CLIENT_SECRET");
        }
        if self.oauth.redirect_uri.is_none() {
            missing.push("GITHUB_REDIRECT_URI");
        }
        if self.webhook.secret.is_none() {
            missing.push("GITHUB_WEBHOOK_SECRET");
        }
        if self.session.secret.is_none() {
            missing.push("SESSION_SECRET");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingRequired { keys: missing })
        }
    }
}
