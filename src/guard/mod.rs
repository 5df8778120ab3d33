//! Route access guard.
//!
//! [`RouteGuard`] owns the rule list, the declared route table and the token
//! validator, and turns `(path, session)` into a [`Verdict`]. The decision
//! itself ([`RouteGuard::decide`]) is pure; only [`RouteGuard::check_token`]
//! touches the network. [`GuardedPage`] wraps it in the per-page state
//! machine, and the HTTP middleware runs one cycle per page request.

pub mod page;
pub mod path;
pub mod rules;

use serde::Serialize;
use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::session::Session;

pub use page::{GuardOutcome, GuardPhase, GuardedPage, Navigator};
pub use path::{is_path_accessible, RouteClass, RouteTable, PUBLIC_ROUTES};
pub use rules::{Decision, GuardContext, GuardRule, RuleSet, Verdict};

/// Validator's answer for the current token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    Valid,
    Invalid,
    /// The validator could not be reached or failed unexpectedly
    Unavailable,
}

impl From<bool> for Validity {
    fn from(valid: bool) -> Self {
        if valid {
            Validity::Valid
        } else {
            Validity::Invalid
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardPolicy {
    /// Render the page when the validator fails instead of treating the
    /// token as invalid
    pub fail_open: bool,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self { fail_open: true }
    }
}

pub const FAIL_OPEN: &str = "fail_open";

pub struct RouteGuard {
    validator: Arc<dyn TokenValidator>,
    rules: RuleSet,
    routes: RouteTable,
    policy: GuardPolicy,
}

impl RouteGuard {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self {
            validator,
            rules: RuleSet::standard(),
            routes: RouteTable::standard(),
            policy: GuardPolicy::default(),
        }
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_policy(mut self, policy: GuardPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn policy(&self) -> GuardPolicy {
        self.policy
    }

    /// Ask the validator once. Only a broken round trip is `Unavailable`;
    /// any other error is a rejection of the token.
    pub async fn check_token(&self, token: &str) -> Validity {
        match self.validator.validate(token).await {
            Ok(valid) => valid.into(),
            Err(e) if e.is_transport() => {
                tracing::warn!("Token validation failed: {}", e);
                Validity::Unavailable
            }
            Err(e) => {
                tracing::warn!("Token rejected by validator error: {}", e);
                Validity::Invalid
            }
        }
    }

    pub fn decide(&self, path: &str, session: &Session, validity: Validity) -> Verdict {
        if validity == Validity::Unavailable && self.policy.fail_open {
            tracing::warn!("Validator unavailable, allowing {} without a verdict", path);
            return Verdict {
                rule: FAIL_OPEN,
                decision: Decision::Allow,
            };
        }

        let verdict = self.rules.evaluate(&GuardContext {
            path,
            session,
            valid: validity == Validity::Valid,
            routes: &self.routes,
        });

        tracing::debug!(
            "Guard {} for {} (role: {:?}, validity: {:?}) -> {:?}",
            verdict.rule,
            path,
            session.role,
            validity,
            verdict.decision
        );

        verdict
    }

    /// One full cycle: validate the session's token, then decide
    pub async fn evaluate(&self, path: &str, session: &Session) -> (Validity, Verdict) {
        let validity = self.check_token(&session.token).await;
        let verdict = self.decide(path, session, validity);
        (validity, verdict)
    }
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("rules", &self.rules)
            .field("routes", &self.routes)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
