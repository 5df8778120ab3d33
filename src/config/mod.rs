use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub guard: GuardConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

/// Which token validator backs the route guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatorKind {
    /// Ask the hosted auth service whether the token belongs to a user
    Remote,
    /// Verify the HS256 signature and expiry locally with the project secret
    Jwt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub service_url: String,
    pub api_key: String,
    pub jwt_secret: String,
    pub validator: ValidatorKind,
    pub timeout_secs: u64,
}

impl AuthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    pub fail_open: bool,
    pub business_only_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub jwt_expiry_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("TRAVEL_BUDDY_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_SERVICE_URL") {
            self.auth.service_url = v;
        }
        if let Ok(v) = env::var("AUTH_API_KEY") {
            self.auth.api_key = v;
        }
        if let Ok(v) = env::var("AUTH_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("AUTH_VALIDATOR") {
            self.auth.validator = parse_validator(&v).unwrap_or(self.auth.validator);
        }
        if let Ok(v) = env::var("AUTH_TIMEOUT_SECS") {
            self.auth.timeout_secs = v.parse().unwrap_or(self.auth.timeout_secs);
        }

        // Guard overrides
        if let Ok(v) = env::var("GUARD_FAIL_OPEN") {
            self.guard.fail_open = v.parse().unwrap_or(self.guard.fail_open);
        }
        if let Ok(v) = env::var("GUARD_BUSINESS_ONLY_PATHS") {
            self.guard.business_only_paths = split_list(&v);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            auth: AuthConfig {
                service_url: "http://localhost:54321".to_string(),
                api_key: String::new(),
                jwt_secret: String::new(),
                validator: ValidatorKind::Remote,
                timeout_secs: 10,
            },
            guard: GuardConfig {
                fail_open: true,
                business_only_paths: default_business_only_paths(),
            },
            security: SecurityConfig {
                cookie_secure: false,
                cors_origins: vec!["http://localhost:3000".to_string()],
                jwt_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            auth: AuthConfig {
                service_url: "https://auth.staging.example.com".to_string(),
                api_key: String::new(),
                jwt_secret: String::new(),
                validator: ValidatorKind::Remote,
                timeout_secs: 5,
            },
            guard: GuardConfig {
                fail_open: false,
                business_only_paths: default_business_only_paths(),
            },
            security: SecurityConfig {
                cookie_secure: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_expiry_hours: 24,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            auth: AuthConfig {
                service_url: "https://auth.example.com".to_string(),
                api_key: String::new(),
                jwt_secret: String::new(),
                validator: ValidatorKind::Remote,
                timeout_secs: 3,
            },
            guard: GuardConfig {
                fail_open: false,
                business_only_paths: default_business_only_paths(),
            },
            security: SecurityConfig {
                cookie_secure: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_expiry_hours: 4,
            },
        }
    }
}

fn default_business_only_paths() -> Vec<String> {
    vec![
        "/destination/[id]/edit".to_string(),
        "/destination/create".to_string(),
        "/attraction/create".to_string(),
    ]
}

fn parse_validator(value: &str) -> Option<ValidatorKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "remote" => Some(ValidatorKind::Remote),
        "jwt" | "local" => Some(ValidatorKind::Jwt),
        _ => None,
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
