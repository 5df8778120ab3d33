#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use travel_buddy::auth::{generate_jwt, Claims};
use travel_buddy::config::{AppConfig, ValidatorKind};
use travel_buddy::session::Role;
use travel_buddy::state::AppState;

pub const JWT_SECRET: &str = "integration-secret";
pub const GOOD_EMAIL: &str = "traveler@example.com";
pub const GOOD_PASSWORD: &str = "correct-horse";
pub const USER_ID: &str = "6f1c1a8e-3d2b-4a55-9f53-0a4f2f1b7c11";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn spawn_router(router: Router) -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer { port, base_url, handle })
}

/// Start the page server with the given configuration
pub async fn spawn_app(config: AppConfig) -> Result<TestServer> {
    let state = AppState::from_config(config)?;
    let server = spawn_router(travel_buddy::app::app(state)).await?;
    wait_ready(&server, Duration::from_secs(5)).await?;
    Ok(server)
}

async fn wait_ready(server: &TestServer, timeout: Duration) -> Result<()> {
    let client = client();
    let deadline = Instant::now() + timeout;
    loop {
        if Instant::now() > deadline {
            break;
        }
        // Any HTTP answer means the listener is accepting
        if client.get(server.url("/health")).send().await.is_ok() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("server did not become ready on {} within {:?}", server.base_url, timeout)
}

/// Client that surfaces redirects instead of following them
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("reqwest client")
}

/// Development config validating tokens locally
pub fn jwt_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.auth.validator = ValidatorKind::Jwt;
    config.auth.jwt_secret = JWT_SECRET.to_string();
    config
}

/// Development config validating tokens against `auth_url`
pub fn remote_config(auth_url: &str) -> AppConfig {
    let mut config = AppConfig::development();
    config.auth.validator = ValidatorKind::Remote;
    config.auth.service_url = auth_url.to_string();
    config.auth.api_key = "anon-key".to_string();
    config.auth.timeout_secs = 2;
    config
}

/// URL on which nothing is listening
pub fn dead_url() -> String {
    let port = portpicker::pick_unused_port().expect("free port");
    format!("http://127.0.0.1:{}", port)
}

pub fn token(role: Option<Role>) -> String {
    let claims = Claims::new(USER_ID.parse().expect("uuid"), Some(GOOD_EMAIL.to_string()), role, 1).expect("claims");
    generate_jwt(&claims, JWT_SECRET).expect("token")
}

pub fn cookie_header(token: &str, role: &str) -> String {
    format!("jwt={}; role={}", token, role)
}

pub fn set_cookies(res: &reqwest::Response) -> Vec<String> {
    res.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

pub fn location(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Minimal stand-in for the hosted auth service
pub async fn spawn_auth_service() -> Result<TestServer> {
    let router = Router::new()
        .route("/auth/v1/health", get(|| async { Json(json!({ "name": "fake-auth" })) }))
        .route("/auth/v1/user", get(fake_user))
        .route("/auth/v1/token", post(fake_token))
        .route("/auth/v1/logout", post(|| async { StatusCode::NO_CONTENT }));

    spawn_router(router).await
}

fn fake_grant(access_token: &str, refresh_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": refresh_token,
        "user": { "id": USER_ID, "email": GOOD_EMAIL }
    })
}

async fn fake_user(headers: HeaderMap) -> impl IntoResponse {
    let has_key = headers.get("apikey").is_some();
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();

    if has_key && token.starts_with("good-token") {
        (StatusCode::OK, Json(json!({ "id": USER_ID, "email": GOOD_EMAIL })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "invalid JWT" })))
    }
}

async fn fake_token(Query(query): Query<std::collections::HashMap<String, String>>, Json(body): Json<Value>) -> impl IntoResponse {
    match query.get("grant_type").map(String::as_str) {
        Some("password") if body["email"] == GOOD_EMAIL && body["password"] == GOOD_PASSWORD => {
            (StatusCode::OK, Json(fake_grant("good-token", "refresh-1")))
        }
        Some("refresh_token") if body["refresh_token"] == "refresh-1" => {
            (StatusCode::OK, Json(fake_grant("good-token-2", "refresh-2")))
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" })),
        ),
    }
}
