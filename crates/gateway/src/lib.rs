//! HTTP edge for the external-integration boundary: webhook intake, the
//! GitHub OAuth flow, and the chat-completion proxy, all on one axum
//! router.

pub mod auth;
pub mod chat;
pub mod codegen;
pub mod error;
pub mod hooks;
pub mod server;
pub mod state;

pub use {
    error::ApiError,
    server::{build_app, start_gateway},
    state::{AppState, GatewayState, WebhookOptions},
};
