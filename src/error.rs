// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;

/// Error returned by the session API, rendered as a `{ success: false }` body
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Authentication is misconfigured")]
    Misconfigured,

    /// The auth service answered with a server fault
    #[error("Authentication service error")]
    AuthServiceFault,

    /// The auth service could not be reached
    #[error("Authentication service temporarily unavailable")]
    AuthServiceDown,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::AuthServiceFault => StatusCode::BAD_GATEWAY,
            ApiError::AuthServiceDown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable code for clients; derived from the status
    pub fn error_code(&self) -> String {
        self.status_code()
            .canonical_reason()
            .unwrap_or("ERROR")
            .to_ascii_uppercase()
            .replace(' ', "_")
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.to_string(),
            "code": self.error_code()
        })
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials(msg) => ApiError::Unauthorized(msg),
            AuthError::Transport(e) => {
                tracing::error!("Auth service transport error: {}", e);
                ApiError::AuthServiceDown
            }
            AuthError::Upstream { status, message } => {
                // Upstream details stay in the log
                tracing::error!("Auth service error {}: {}", status, message);
                ApiError::AuthServiceFault
            }
            AuthError::InvalidUrl(_) | AuthError::InvalidSecret | AuthError::TokenGeneration(_) => {
                tracing::error!("Auth configuration error: {}", err);
                ApiError::Misconfigured
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
