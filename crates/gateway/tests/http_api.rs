//! End-to-end tests through the assembled router, one request at a time
//! via `tower::ServiceExt::oneshot`.

use std::time::Duration;

use {
    axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    },
    http_body_util::BodyExt,
    serde_json::{Value, json},
    tower::ServiceExt,
};

use {
    portico_gateway::{GatewayState, WebhookOptions, build_app},
    portico_oauth::{GithubOAuthClient, OAuthEndpoints},
    portico_pool::WorkerPool,
    portico_providers::{DeepseekProvider, OllamaProvider, ProviderGateway},
    portico_sessions::SessionIssuer,
    portico_webhook::sign,
};

const WEBHOOK_SECRET: &str = "test-webhook-secret";
const SESSION_SECRET: &str = "test-session-secret";

/// Build an app whose outbound calls all target `upstream` (a mockito
/// server); paths disambiguate the fake endpoints.
fn test_app(upstream: &str) -> Router {
    test_app_with_pool(upstream, WorkerPool::new(2, 2))
}

fn test_app_with_pool(upstream: &str, pool: WorkerPool) -> Router {
    let endpoints = OAuthEndpoints {
        authorize_url: format!("{upstream}/login/oauth/authorize"),
        token_url: format!("{upstream}/login/oauth/access_token"),
        user_url: format!("{upstream}/user"),
    };
    let oauth = GithubOAuthClient::with_endpoints(
        "client-id",
        "client-secret",
        "http://localhost/auth/github/callback",
        None,
        endpoints,
        Duration::from_secs(2),
    );
    let providers = ProviderGateway::new(
        DeepseekProvider::new(
            Some("sk-test".into()),
            upstream.to_string(),
            Duration::from_secs(2),
        ),
        OllamaProvider::new(upstream.to_string(), Duration::from_secs(2)),
    );
    let state = GatewayState::new(
        oauth,
        SessionIssuer::new(SESSION_SECRET),
        providers,
        pool,
        WebhookOptions {
            secret: WEBHOOK_SECRET.into(),
            log_source_ip: false,
        },
        Duration::from_secs(5),
        7,
    );
    build_app(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

// ── Health ──

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app("http://127.0.0.1:1");
    let response = app
        .oneshot(
            Request::get("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

// ── Webhooks ──

fn webhook_request(body: &[u8], signature: &str, event: &str) -> Request<Body> {
    Request::post("/api/webhook/github")
        .header("x-hub-signature-256", signature)
        .header("x-github-event", event)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_vec()))
        .expect("request")
}

#[tokio::test]
async fn webhook_with_valid_signature_is_processed() {
    let app = test_app("http://127.0.0.1:1");
    let body = br#"{"zen":"Keep it logically awesome."}"#;
    let signature = sign(body, WEBHOOK_SECRET);

    let response = app
        .oneshot(webhook_request(body, &signature, "ping"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "processed");
}

#[tokio::test]
async fn webhook_with_tampered_body_is_rejected() {
    let app = test_app("http://127.0.0.1:1");
    let signature = sign(br#"{"ref":"refs/heads/main"}"#, WEBHOOK_SECRET);
    let tampered = br#"{"ref":"refs/heads/evil"}"#;

    let response = app
        .oneshot(webhook_request(tampered, &signature, "push"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid signature");
}

#[tokio::test]
async fn webhook_without_signature_is_rejected() {
    let app = test_app("http://127.0.0.1:1");
    let response = app
        .oneshot(
            Request::post("/api/webhook/github")
                .header("x-github-event", "push")
                .body(Body::from(&b"{}"[..]))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_with_unknown_event_is_still_acknowledged() {
    let app = test_app("http://127.0.0.1:1");
    let body = br#"{"action":"completed"}"#;
    let signature = sign(body, WEBHOOK_SECRET);

    let response = app
        .oneshot(webhook_request(body, &signature, "workflow_run"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

// ── OAuth flow ──

#[tokio::test]
async fn login_redirects_to_authorize_url() {
    let app = test_app("http://127.0.0.1:1");
    let response = app
        .oneshot(
            Request::get("/auth/github")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION]
        .to_str()
        .expect("location header");
    assert!(location.contains("client_id=client-id"));
    assert!(location.contains("scope="));
}

#[tokio::test]
async fn callback_without_code_is_rejected() {
    let app = test_app("http://127.0.0.1:1");
    let response = app
        .oneshot(
            Request::get("/auth/github/callback")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!response.headers().contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn callback_success_sets_session_cookie() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/login/oauth/access_token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"gho_abc123","token_type":"bearer"}"#)
        .create_async()
        .await;
    let user = server
        .mock("GET", "/user")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":77,"login":"octocat","email":"octo@example.com"}"#)
        .create_async()
        .await;

    let app = test_app(&server.url());
    let response = app
        .oneshot(
            Request::get("/auth/github/callback?code=good-code")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .expect("cookie header");
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    token.assert_async().await;
    user.assert_async().await;
}

#[tokio::test]
async fn callback_with_rejected_code_returns_bad_request() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/login/oauth/access_token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"bad_verification_code"}"#)
        .create_async()
        .await;
    let user = server.mock("GET", "/user").expect(0).create_async().await;

    let app = test_app(&server.url());
    let response = app
        .oneshot(
            Request::get("/auth/github/callback?code=stale-code")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!response.headers().contains_key(header::SET_COOKIE));
    token.assert_async().await;
    user.assert_async().await;
}

#[tokio::test]
async fn me_requires_a_valid_cookie() {
    let app = test_app("http://127.0.0.1:1");
    let response = app
        .oneshot(
            Request::get("/auth/me")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_identity_for_a_session_issued_here() {
    let issuer = SessionIssuer::new(SESSION_SECRET);
    let credential = issuer
        .issue(
            &portico_oauth::Identity {
                id: 7,
                login: "octocat".into(),
                email: None,
            },
            "gho_abc123",
        )
        .expect("issue session");

    let app = test_app("http://127.0.0.1:1");
    let response = app
        .oneshot(
            Request::get("/auth/me")
                .header(header::COOKIE, format!("auth_token={credential}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["login"], "octocat");
    assert_eq!(body["id"], 7);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let issuer = SessionIssuer::new(SESSION_SECRET);
    let credential = issuer
        .issue(
            &portico_oauth::Identity {
                id: 7,
                login: "octocat".into(),
                email: None,
            },
            "gho_abc123",
        )
        .expect("issue session");

    let app = test_app("http://127.0.0.1:1");
    let response = app
        .oneshot(
            Request::get("/auth/logout")
                .header(header::COOKIE, format!("auth_token={credential}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .expect("cookie header");
    // An expiring removal cookie on the same path as issuance.
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=0"));
}

// ── Chat ──

fn chat_request(body: Value) -> Request<Body> {
    Request::post("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn chat_with_unsupported_model_is_rejected_without_network() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let app = test_app(&server.url());
    let response = app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "model": "gpt-5",
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    upstream.assert_async().await;
}

#[tokio::test]
async fn chat_with_empty_messages_is_rejected() {
    let app = test_app("http://127.0.0.1:1");
    let response = app
        .oneshot(chat_request(json!({ "messages": [] })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_routes_to_deepseek_and_rewraps_the_answer() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"choices":[{"message":{"role":"assistant","content":"2"}}],"usage":{"total_tokens":9}}"#,
        )
        .create_async()
        .await;

    let app = test_app(&server.url());
    let response = app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "1+1?"}],
            "model": "deepseek-chat",
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["choices"][0]["message"]["content"], "2");
    assert_eq!(body["provider"], "deepseek");
    assert_eq!(body["usage"]["total_tokens"], 9);
    upstream.assert_async().await;
}

#[tokio::test]
async fn chat_sheds_load_when_the_pool_is_saturated() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(500));
            w.write_all(br#"{"choices":[{"message":{"content":"slow answer"}}]}"#)
        })
        .create_async()
        .await;

    // One worker, no queue: a single in-flight request fills the pool.
    let app = test_app_with_pool(&server.url(), WorkerPool::new(1, 0));

    let first = tokio::spawn(app.clone().oneshot(chat_request(json!({
        "messages": [{"role": "user", "content": "take your time"}],
        "model": "deepseek-chat",
    }))));
    // Give the first request time to claim the only slot.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "me too"}],
            "model": "deepseek-chat",
        })))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);

    // The in-flight request is unaffected by the shed one.
    let first = first.await.expect("join").expect("response");
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(
        body_json(first).await["choices"][0]["message"]["content"],
        "slow answer"
    );
}

#[tokio::test]
async fn chat_backend_failure_maps_to_internal_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let app = test_app(&server.url());
    let response = app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "model": "deepseek-chat",
        })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ── Code endpoints ──

#[tokio::test]
async fn generate_code_wraps_the_local_model_answer() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", "/api/generate")
        .match_body(mockito::Matcher::PartialJson(json!({ "model": "llama2" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response":"print('sorted')","eval_count":5}"#)
        .create_async()
        .await;

    let app = test_app(&server.url());
    let response = app
        .oneshot(
            Request::post("/api/generate-code")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "prompt": "sort a list of numbers" }).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["code"], "print('sorted')");
    upstream.assert_async().await;
}

#[tokio::test]
async fn analyze_performance_wraps_the_analysis() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", "/api/generate")
        .match_body(mockito::Matcher::PartialJson(json!({ "model": "llama2" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response":"linear scan, O(n)"}"#)
        .create_async()
        .await;

    let app = test_app(&server.url());
    let response = app
        .oneshot(
            Request::post("/api/analyze-performance")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "code": "for x in xs: pass" }).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["analysis"], "linear scan, O(n)");
    upstream.assert_async().await;
}

#[tokio::test]
async fn system_status_reports_models_and_pool_headroom() {
    let app = test_app("http://127.0.0.1:1");
    let response = app
        .oneshot(
            Request::get("/system/status")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(
        body["supported_models"]
            .as_array()
            .expect("models array")
            .contains(&json!("deepseek-chat"))
    );
    assert_eq!(body["pool"]["capacity"], 4);
    assert_eq!(body["pool"]["available"], 4);
}
