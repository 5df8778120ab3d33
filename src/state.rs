use std::sync::Arc;

use crate::auth::{AuthClient, AuthError, JwtValidator, RemoteValidator, TokenValidator};
use crate::config::{AppConfig, ValidatorKind};
use crate::guard::{GuardPolicy, RouteGuard, RouteTable};

/// Shared handles for request handlers and the guard middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthClient,
    pub guard: Arc<RouteGuard>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self, AuthError> {
        let auth = AuthClient::new(&config.auth.service_url, config.auth.api_key.clone(), config.auth.timeout())?;

        let validator: Arc<dyn TokenValidator> = match config.auth.validator {
            ValidatorKind::Remote => Arc::new(RemoteValidator::new(auth.clone())),
            ValidatorKind::Jwt => Arc::new(JwtValidator::new(config.auth.jwt_secret.clone())?),
        };

        let guard = RouteGuard::new(validator)
            .with_routes(RouteTable::standard().with_business_only(&config.guard.business_only_paths))
            .with_policy(GuardPolicy {
                fail_open: config.guard.fail_open,
            });

        tracing::info!(
            "Route guard ready ({:?} validator, fail_open: {})",
            config.auth.validator,
            config.guard.fail_open
        );

        Ok(Self {
            config: Arc::new(config),
            auth,
            guard: Arc::new(guard),
        })
    }

    pub fn cookie_secure(&self) -> bool {
        self.config.security.cookie_secure
    }
}
