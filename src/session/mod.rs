//! Viewer session: the bearer token and role label persisted for a browser tab.
//!
//! The guard never touches storage directly; it reads and clears the session
//! through [`SessionStore`]. Pages served over HTTP keep the session in
//! cookies ([`CookieSession`]), the in-process mount model keeps it in
//! memory ([`MemorySessionStore`]).

pub mod cookie;
pub mod memory;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use cookie::CookieSession;
pub use memory::MemorySessionStore;

pub const JWT_KEY: &str = "jwt";
pub const ROLE_KEY: &str = "role";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Actor kinds with their own dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Business,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::User, Role::Business];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Business => "business",
        }
    }

    /// Landing page for a signed-in viewer with this role
    pub fn dashboard(&self) -> String {
        format!("/dashboard/{}", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "business" => Ok(Role::Business),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Snapshot of the stored session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Empty when nobody is signed in
    pub token: String,
    pub role: Option<Role>,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a session from raw stored values. Missing, empty or
    /// unrecognised role labels all mean "no role".
    pub fn from_parts(token: Option<String>, role: Option<String>) -> Self {
        let role = role.as_deref().filter(|r| !r.is_empty()).and_then(|r| match r.parse() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::debug!("Ignoring stored role: {}", e);
                None
            }
        });

        Self {
            token: token.unwrap_or_default(),
            role,
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Read/write contract over the persisted session keys.
///
/// Writes to `jwt` and `role` are not atomic with respect to each other.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    /// Sign the viewer out by blanking both session fields
    fn clear(&self) {
        self.set(JWT_KEY, "");
        self.set(ROLE_KEY, "");
    }

    fn load(&self) -> Session {
        Session::from_parts(self.get(JWT_KEY), self.get(ROLE_KEY))
    }

    /// Populate the session after a login or OAuth callback
    fn store(&self, token: &str, role: Role, refresh_token: Option<&str>) {
        self.set(JWT_KEY, token);
        self.set(ROLE_KEY, role.as_str());
        if let Some(refresh) = refresh_token {
            self.set(REFRESH_TOKEN_KEY, refresh);
        }
    }
}

impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }
}
