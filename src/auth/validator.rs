use async_trait::async_trait;

use super::{decode_jwt, AuthClient, AuthError};

/// Decides whether a bearer token currently authenticates a user.
///
/// Implementations resolve `Ok(false)` for empty, expired or malformed
/// tokens and reserve `Err` for failures to reach a verdict.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<bool, AuthError>;
}

/// Validates tokens by asking the auth service who they belong to
#[derive(Debug, Clone)]
pub struct RemoteValidator {
    client: AuthClient,
}

impl RemoteValidator {
    pub fn new(client: AuthClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenValidator for RemoteValidator {
    async fn validate(&self, token: &str) -> Result<bool, AuthError> {
        if token.is_empty() {
            return Ok(false);
        }

        match self.client.get_user(token).await? {
            Some(user) => {
                tracing::debug!("Token belongs to user {}", user.id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Validates HS256 tokens offline against the project secret
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
}

impl JwtValidator {
    pub fn new(secret: impl Into<String>) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }
        Ok(Self { secret })
    }
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenValidator for JwtValidator {
    async fn validate(&self, token: &str) -> Result<bool, AuthError> {
        if token.is_empty() {
            return Ok(false);
        }

        match decode_jwt(token, &self.secret) {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::debug!("Rejected token: {}", e);
                Ok(false)
            }
        }
    }
}
