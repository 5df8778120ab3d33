use thiserror::Error;

/// Failures talking to, or configuring, the token authority
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Auth service returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid auth service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

impl AuthError {
    /// Whether the failure is a broken round trip rather than a verdict
    pub fn is_transport(&self) -> bool {
        matches!(self, AuthError::Transport(_) | AuthError::Upstream { status: 500..=599, .. })
    }
}
