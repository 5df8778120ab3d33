// handlers/auth.rs - session lifecycle endpoints
//
// Login, refresh and logout talk to the hosted auth service and mirror the
// outcome into the session cookies the route guard reads.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::guard::Validity;
use crate::middleware::{ApiResponse, ApiResult};
use crate::session::{CookieSession, Role, SessionStore, UnknownRole, JWT_KEY, REFRESH_TOKEN_KEY};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: Uuid,
    pub role: Role,
    pub expires_in: Option<u64>,
}

/// POST /api/auth/login/:role - password login for a user or business account
pub async fn login(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let role: Role = role.parse().map_err(|e: UnknownRole| ApiError::bad_request(e.to_string()))?;

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required!"));
    }

    let grant = state.auth.sign_in_with_password(&payload.email, &payload.password).await?;
    tracing::info!("Signed in {} as {}", grant.user.id, role);

    let session = CookieSession::empty(state.cookie_secure());
    session.store(&grant.access_token, role, grant.refresh_token.as_deref());

    Ok(ApiResponse::success(LoginResponse {
        access_token: grant.access_token,
        user_id: grant.user.id,
        role,
        expires_in: grant.expires_in,
    })
    .with_session(&session))
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: Option<u64>,
}

/// POST /api/auth/refresh - exchange a refresh token for a new session
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<RefreshResponse> {
    let session = CookieSession::from_headers(&headers, state.cookie_secure());

    let refresh_token = body
        .and_then(|Json(req)| req.refresh_token)
        .or_else(|| session.get(REFRESH_TOKEN_KEY))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Refresh token is required!"))?;

    let grant = state.auth.refresh_session(&refresh_token).await?;

    session.set(JWT_KEY, &grant.access_token);
    if let Some(next) = grant.refresh_token.as_deref() {
        session.set(REFRESH_TOKEN_KEY, next);
    }

    Ok(ApiResponse::success(RefreshResponse {
        access_token: grant.access_token,
        expires_in: grant.expires_in,
    })
    .with_session(&session))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub redirect: &'static str,
}

/// POST /api/auth/logout - revoke the session and clear its cookies
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<LogoutResponse> {
    let session = CookieSession::from_headers(&headers, state.cookie_secure());
    let current = session.load();

    if current.has_token() {
        // Revocation is best effort; the cookies go either way
        if let Err(e) = state.auth.sign_out(&current.token).await {
            tracing::warn!("Auth service sign-out failed: {}", e);
        }
    }

    session.clear();
    session.set(REFRESH_TOKEN_KEY, "");

    let redirect = match current.role {
        Some(Role::Business) => "/login/business",
        _ => "/",
    };

    Ok(ApiResponse::success(LogoutResponse { redirect }).with_session(&session))
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub signed_in: bool,
    pub role: Option<Role>,
    pub validity: Validity,
}

/// GET /api/auth/session - who the cookies say is signed in
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SessionInfo> {
    let current = CookieSession::from_headers(&headers, state.cookie_secure()).load();
    let validity = state.guard.check_token(&current.token).await;

    Ok(ApiResponse::success(SessionInfo {
        signed_in: validity == Validity::Valid,
        role: current.role,
        validity,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub role: Option<String>,
}

/// GET /auth/callbackv1 - OAuth landing page that stores the new session
pub async fn callback(State(state): State<AppState>, Query(params): Query<CallbackParams>) -> Response {
    let Some(token) = params.access_token.filter(|t| !t.is_empty()) else {
        tracing::warn!("OAuth callback without an access token");
        return Redirect::to("/").into_response();
    };

    let role = params
        .role
        .as_deref()
        .and_then(|r| r.parse::<Role>().ok())
        .unwrap_or(Role::User);

    let session = CookieSession::empty(state.cookie_secure());
    session.store(&token, role, params.refresh_token.as_deref());
    tracing::debug!("OAuth callback stored {} session", role);

    let mut response = Redirect::to(&role.dashboard()).into_response();
    session.apply(&mut response);
    response
}
