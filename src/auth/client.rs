use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::AuthError;

/// User record returned by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session issued by a password or refresh-token grant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// HTTP client for the hosted auth service (GoTrue-compatible REST API)
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl AuthClient {
    pub fn new(service_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let mut base = service_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        Ok(self.base_url.join(path)?)
    }

    /// Look up the user a bearer token belongs to.
    ///
    /// Returns `Ok(None)` when the service rejects the token; only transport
    /// problems and server faults are errors.
    pub async fn get_user(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
        let url = self.endpoint("auth/v1/user")?;

        let res = self
            .http
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        match res.status() {
            status if status.is_success() => Ok(Some(res.json::<AuthUser>().await?)),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                tracing::debug!("Auth service rejected token with {}", res.status());
                Ok(None)
            }
            status => Err(upstream_error(status, res).await),
        }
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<TokenGrant, AuthError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        self.grant(url, json!({ "email": email, "password": password })).await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");

        self.grant(url, json!({ "refresh_token": refresh_token })).await
    }

    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let url = self.endpoint("auth/v1/logout")?;

        let res = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        if res.status().is_success() {
            Ok(())
        } else {
            Err(upstream_error(res.status(), res).await)
        }
    }

    pub async fn health(&self) -> Result<(), AuthError> {
        let url = self.endpoint("auth/v1/health")?;

        let res = self.http.get(url).header("apikey", &self.api_key).send().await?;

        if res.status().is_success() {
            Ok(())
        } else {
            Err(upstream_error(res.status(), res).await)
        }
    }

    async fn grant(&self, url: Url, body: Value) -> Result<TokenGrant, AuthError> {
        let res = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            return Ok(res.json::<TokenGrant>().await?);
        }

        if status.is_client_error() {
            let message = error_message(res).await;
            return Err(AuthError::InvalidCredentials(message));
        }

        Err(upstream_error(status, res).await)
    }
}

async fn upstream_error(status: StatusCode, res: reqwest::Response) -> AuthError {
    AuthError::Upstream {
        status: status.as_u16(),
        message: error_message(res).await,
    }
}

/// Best-effort human-readable message from an auth service error body
async fn error_message(res: reqwest::Response) -> String {
    let status = res.status();
    match res.json::<Value>().await {
        Ok(body) => ["error_description", "msg", "message", "error"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string()),
        Err(_) => status.to_string(),
    }
}
