use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::config::ValidatorKind;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET /health - liveness plus reachability of the token authority
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    if state.config.auth.validator == ValidatorKind::Jwt {
        return ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "validator": "jwt"
        }));
    }

    match state.auth.health().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "validator": "remote",
            "auth": "ok"
        })),
        Err(e) => ApiResponse::with_status(
            json!({
                "status": "degraded",
                "timestamp": now,
                "validator": "remote",
                "auth_error": e.to_string()
            }),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
    }
}
