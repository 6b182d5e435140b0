//! GitHub OAuth endpoints and the session cookie extractor.

use {
    axum::{
        Json,
        extract::{FromRequestParts, Query, State},
        http::request::Parts,
        response::Redirect,
    },
    axum_extra::extract::cookie::{Cookie, CookieJar},
    serde::Deserialize,
    serde_json::{Value, json},
    tracing::info,
};

use portico_sessions::Session;

use crate::{error::ApiError, state::AppState};

const AUTH_COOKIE: &str = "auth_token";

// ── Login redirects ──

#[derive(Deserialize)]
pub struct LoginQuery {
    setup: Option<String>,
}

pub async fn login(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Redirect {
    Redirect::to(&state.gateway.oauth.authorize_url(query.setup.is_some()))
}

/// Post-install entry point: same authorize URL, setup callback target.
pub async fn setup(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.gateway.oauth.authorize_url(true))
}

// ── Callback ──

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    /// Present when the flow started from the app-installation page.
    setup: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return Err(ApiError::bad_request("Missing authorization code"));
    };

    let token = state.gateway.oauth.exchange(code).await?;
    let identity = state.gateway.oauth.fetch_identity(&token).await?;
    let credential = state
        .gateway
        .sessions
        .issue(&identity, &token.access_token)
        .map_err(|err| {
            tracing::error!(error = %err, "failed to issue session");
            ApiError::new(
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create session",
            )
        })?;

    info!(user = identity.login, "oauth login complete");

    let cookie = Cookie::build((AUTH_COOKIE, credential))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::days(state.gateway.session_ttl_days))
        .build();

    let target = if query.setup.is_some() {
        "/setup-complete"
    } else {
        "/dashboard"
    };
    Ok((jar.add(cookie), Redirect::to(target)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    // The removal cookie must match the path issuance used, or browsers
    // keep the original.
    let removal = Cookie::build(AUTH_COOKIE).path("/").build();
    (jar.remove(removal), Redirect::to("/"))
}

// ── Current user ──

/// Extractor that requires a valid session cookie. Any verification
/// failure collapses to 401; the distinction lives in the session crate's
/// logs, not the response.
pub struct CurrentUser(pub Session);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = match CookieJar::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        let Some(cookie) = jar.get(AUTH_COOKIE) else {
            return Err(ApiError::unauthorized());
        };
        state
            .gateway
            .sessions
            .verify(cookie.value())
            .map(CurrentUser)
            .map_err(|_| ApiError::unauthorized())
    }
}

pub async fn me(CurrentUser(session): CurrentUser) -> Json<Value> {
    Json(json!({
        "id": session.identity.id,
        "login": session.identity.login,
        "email": session.identity.email,
    }))
}
