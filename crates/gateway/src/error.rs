//! One error type for every handler, mapped to a JSON problem body.

use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde_json::json,
    tracing::{error, warn},
};

use {
    portico_oauth::OAuthError, portico_pool::PoolError, portico_providers::InvalidChatRequest,
    portico_providers::ProviderError,
};

/// HTTP-facing error. Internal detail stays in the logs; the body carries
/// only what the client can act on.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            // The provider answered and said no; the client sent a bad or
            // stale code.
            OAuthError::Exchange { payload } => {
                warn!(payload, "token exchange rejected");
                Self::bad_request("Failed to obtain access token")
            },
            OAuthError::IdentityLookup { status } => {
                error!(status, "identity lookup failed");
                Self::new(StatusCode::BAD_GATEWAY, "Failed to fetch user info")
            },
            OAuthError::Timeout => {
                error!("oauth upstream timed out");
                Self::new(StatusCode::GATEWAY_TIMEOUT, "Upstream provider timed out")
            },
            OAuthError::Transport(detail) => {
                error!(detail, "oauth transport failure");
                Self::new(StatusCode::BAD_GATEWAY, "Upstream provider unreachable")
            },
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match &err {
            ProviderError::UnsupportedModel { model } => {
                Self::bad_request(format!("Unsupported model: {model}"))
            },
            ProviderError::Timeout { provider } => {
                error!(provider, "provider call timed out");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{provider} request timed out"),
                )
            },
            ProviderError::Backend {
                provider,
                status,
                message,
            } => {
                error!(provider, ?status, message, "provider backend error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{provider} request failed"),
                )
            },
            ProviderError::NotConfigured { provider } => {
                error!(provider, "provider not configured");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{provider} is not configured"),
                )
            },
        }
    }
}

impl From<PoolError> for ApiError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Overloaded { capacity } => {
                warn!(capacity, "rejecting request, worker pool saturated");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Server is at capacity, try again shortly",
                )
            },
            PoolError::DeadlineExceeded { deadline } => {
                error!(?deadline, "chat task exceeded the request deadline");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Request timed out")
            },
            PoolError::TaskFailed => {
                error!("chat task failed to complete");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Request failed")
            },
        }
    }
}

impl From<InvalidChatRequest> for ApiError {
    fn from(err: InvalidChatRequest) -> Self {
        Self::bad_request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_rejection_maps_to_bad_request() {
        let err = ApiError::from(OAuthError::Exchange {
            payload: r#"{"error":"bad_verification_code"}"#.into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn overload_maps_to_service_unavailable() {
        let err = ApiError::from(PoolError::Overloaded { capacity: 8 });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn upstream_timeout_maps_to_gateway_timeout() {
        let err = ApiError::from(OAuthError::Timeout);
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn unsupported_model_maps_to_bad_request() {
        let err = ApiError::from(ProviderError::UnsupportedModel {
            model: "gpt-5".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
