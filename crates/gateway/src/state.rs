//! Shared state threaded through every gateway handler.

use std::{sync::Arc, time::Duration};

use portico_config::PorticoConfig;
use portico_oauth::GithubOAuthClient;
use portico_pool::WorkerPool;
use portico_providers::{DeepseekProvider, OllamaProvider, ProviderGateway};
use portico_sessions::SessionIssuer;
use secrecy::ExposeSecret;

/// Webhook verification knobs lifted out of the config so tests can
/// construct a state without touching the loader.
#[derive(Clone)]
pub struct WebhookOptions {
    pub secret: String,
    pub log_source_ip: bool,
}

pub struct GatewayState {
    pub oauth: GithubOAuthClient,
    pub sessions: SessionIssuer,
    pub providers: Arc<ProviderGateway>,
    pub pool: WorkerPool,
    pub webhook: WebhookOptions,
    /// End-to-end deadline for an offloaded chat completion.
    pub request_deadline: Duration,
    /// Cookie lifetime, kept in lockstep with the session TTL.
    pub session_ttl_days: i64,
}

impl GatewayState {
    pub fn new(
        oauth: GithubOAuthClient,
        sessions: SessionIssuer,
        providers: ProviderGateway,
        pool: WorkerPool,
        webhook: WebhookOptions,
        request_deadline: Duration,
        session_ttl_days: i64,
    ) -> Arc<Self> {
        Arc::new(Self {
            oauth,
            sessions,
            providers: Arc::new(providers),
            pool,
            webhook,
            request_deadline,
            session_ttl_days,
        })
    }

    /// Builds the full runtime state from a validated config.
    pub fn from_config(config: &PorticoConfig) -> anyhow::Result<Arc<Self>> {
        config.validate()?;

        let oauth = GithubOAuthClient::new(
            config.oauth.client_id.clone().unwrap_or_default(),
            config
                .oauth
                .client_secret
                .as_ref()
                .map(|s| s.expose_secret().clone())
                .unwrap_or_default(),
            config.oauth.redirect_uri.clone().unwrap_or_default(),
            config.oauth.setup_url.clone(),
        );

        let session_secret = config
            .session
            .secret
            .as_ref()
            .map(|s| s.expose_secret().clone())
            .unwrap_or_default();
        let ttl_days = config.session.ttl_days as i64;
        let sessions = SessionIssuer::with_ttl_days(&session_secret, ttl_days);

        let providers = ProviderGateway::new(
            DeepseekProvider::new(
                config
                    .providers
                    .deepseek
                    .api_key
                    .as_ref()
                    .map(|s| s.expose_secret().clone()),
                config.providers.deepseek.base_url.clone(),
                Duration::from_secs(config.providers.deepseek.timeout_secs),
            ),
            OllamaProvider::new(
                config.providers.ollama.base_url.clone(),
                Duration::from_secs(config.providers.ollama.timeout_secs),
            ),
        );

        let pool = WorkerPool::new(config.pool.workers, config.pool.queue);

        let webhook = WebhookOptions {
            secret: config
                .webhook
                .secret
                .as_ref()
                .map(|s| s.expose_secret().clone())
                .unwrap_or_default(),
            log_source_ip: config.webhook.log_source_ip,
        };

        Ok(Self::new(
            oauth,
            sessions,
            providers,
            pool,
            webhook,
            Duration::from_secs(config.pool.request_deadline_secs),
            ttl_days,
        ))
    }
}

/// Cloneable handle handed to the axum router.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}
