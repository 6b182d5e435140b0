use {
    serde_json::Value,
    tracing::{debug, info},
};

/// Webhook event types this gateway acts on, plus a catch-all for everything
/// the peer may add later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Push,
    PullRequest,
    Issues,
    Installation,
    Ping,
    /// Unrecognized event type, carried for logging only.
    Other(String),
}

impl EventKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "push" => Self::Push,
            "pull_request" => Self::PullRequest,
            "issues" => Self::Issues,
            "installation" => Self::Installation,
            "ping" => Self::Ping,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
            Self::Issues => "issues",
            Self::Installation => "installation",
            Self::Ping => "ping",
            Self::Other(name) => name,
        }
    }
}

/// Route a verified event to its handler. Returns whether a handler ran;
/// unknown types are accepted and ignored, never an error.
///
/// Handlers run synchronously in the calling context and only extract a few
/// payload fields — the heavy follow-up work (code analysis, review) lives
/// behind other services and is not triggered from here.
pub fn dispatch(kind: &EventKind, payload: &Value) -> bool {
    match kind {
        EventKind::Push => {
            on_push(payload);
            true
        },
        EventKind::PullRequest => {
            on_pull_request(payload);
            true
        },
        EventKind::Issues => {
            on_issues(payload);
            true
        },
        EventKind::Installation => {
            on_installation(payload);
            true
        },
        EventKind::Ping => {
            on_ping(payload);
            true
        },
        EventKind::Other(name) => {
            debug!(event = %name, "ignoring unrecognized webhook event");
            false
        },
    }
}

fn repo_name(payload: &Value) -> &str {
    payload["repository"]["full_name"].as_str().unwrap_or("<unknown>")
}

fn on_push(payload: &Value) {
    let commits = payload["commits"].as_array().map(Vec::len).unwrap_or(0);
    info!(repo = repo_name(payload), commits, "push event received");
}

fn on_pull_request(payload: &Value) {
    let action = payload["action"].as_str().unwrap_or("");
    let number = payload["pull_request"]["number"].as_u64();
    // opened/synchronize are the states a review pass would pick up.
    let review_relevant = matches!(action, "opened" | "synchronize");
    info!(
        repo = repo_name(payload),
        action,
        number,
        review_relevant,
        "pull request event received"
    );
}

fn on_issues(payload: &Value) {
    let action = payload["action"].as_str().unwrap_or("");
    info!(repo = repo_name(payload), action, "issues event received");
}

fn on_installation(payload: &Value) {
    let action = payload["action"].as_str().unwrap_or("");
    let installation_id = payload["installation"]["id"].as_u64();
    match action {
        "created" => info!(installation_id, "app installed"),
        "deleted" => info!(installation_id, "app uninstalled"),
        _ => debug!(installation_id, action, "installation event received"),
    }
}

fn on_ping(_payload: &Value) {
    info!("webhook configured successfully");
}
