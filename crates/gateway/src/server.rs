use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Json, Router,
        extract::State,
        routing::{get, post},
    },
    serde_json::{Value, json},
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use crate::{
    auth, chat, codegen, hooks,
    state::{AppState, GatewayState},
};

/// Assemble the router. Shared with the integration tests so they exercise
/// exactly the routing and layering production runs.
pub fn build_app(gateway: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/system/status", get(system_status))
        .route("/api/webhook/github", post(hooks::github_webhook))
        .route("/auth/github", get(auth::login))
        .route("/auth/setup", get(auth::setup))
        .route("/auth/github/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/api/chat", post(chat::chat_completion))
        .route("/api/generate-code", post(codegen::generate_code))
        .route("/api/analyze-performance", post(codegen::analyze_performance))
        .layer(cors)
        .with_state(AppState { gateway })
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Capability report: the model ids the router accepts and the pool's
/// current headroom.
async fn system_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "supported_models": [
            "deepseek-chat",
            "ollama-llama2",
            "ollama-codellama",
            "ollama-deepseek-coder",
        ],
        "pool": {
            "capacity": state.gateway.pool.capacity(),
            "available": state.gateway.pool.available(),
        },
    }))
}

/// Load config, build state, and serve until the process is stopped.
pub async fn start_gateway(bind: &str, port: u16) -> anyhow::Result<()> {
    let config = portico_config::discover_and_load();
    let state = GatewayState::from_config(&config)?;

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let lines = [
        format!("portico gateway v{}", env!("CARGO_PKG_VERSION")),
        format!("listening on http://{addr}"),
        format!(
            "providers: deepseek={} ollama={}",
            if config.providers.deepseek.api_key.is_some() {
                "configured"
            } else {
                "disabled"
            },
            config.providers.ollama.base_url,
        ),
        format!(
            "pool: {} workers, queue depth {}",
            config.pool.workers, config.pool.queue
        ),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0);
    info!("┌─{}─┐", "─".repeat(width));
    for line in &lines {
        info!("│ {line:width$} │");
    }
    info!("└─{}─┘", "─".repeat(width));

    let app = build_app(state);
    axum::serve(listener, app).await?;
    Ok(())
}
