//! Inbound webhook endpoint.
//!
//! Verification is strict and unconditional: the raw body is checked
//! against the shared secret before any parsing or dispatch, and a failed
//! check ends the request with 401. Dispatch itself never fails the HTTP
//! response; an event nobody handles is still acknowledged so the sender
//! does not retry.

use {
    axum::{
        Json,
        body::Bytes,
        extract::State,
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
    },
    serde_json::{Value, json},
    tracing::{info, warn},
};

use portico_webhook::{EventKind, dispatch, verify_signature};

use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const EVENT_HEADER: &str = "x-github-event";

pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    if !verify_signature(&body, &state.gateway.webhook.secret, signature) {
        if state.gateway.webhook.log_source_ip {
            warn!(source = source_hint(&headers), "invalid webhook signature");
        } else {
            warn!("invalid webhook signature");
        }
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid signature" })),
        )
            .into_response();
    }

    let event = headers
        .get(EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let kind = EventKind::parse(event);
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let handled = dispatch(&kind, &payload);
    info!(event = kind.as_str(), handled, "webhook processed");

    (StatusCode::OK, Json(json!({ "status": "processed" }))).into_response()
}

/// Best-effort sender hint for rejection logs. Proxy headers are spoofable,
/// so this is diagnostics only and never feeds verification.
fn source_hint(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
