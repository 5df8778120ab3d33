//! The guard's ordered rule list.
//!
//! Rules are evaluated first-match-wins; the order below is load-bearing
//! because several rules can match the same navigation.

use serde::Serialize;

use super::path::{names_role, RouteClass, RouteTable};
use crate::session::{Role, Session};

/// What the guard does with a navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    /// Replace the current history entry with `target`
    Redirect(String),
    /// Sign the viewer out, then redirect
    ClearAndRedirect(String),
}

impl Decision {
    pub fn target(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Redirect(target) | Decision::ClearAndRedirect(target) => Some(target),
        }
    }
}

/// Inputs every rule sees
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    pub path: &'a str,
    pub session: &'a Session,
    pub valid: bool,
    pub routes: &'a RouteTable,
}

impl GuardContext<'_> {
    fn is_role(&self, role: Role) -> bool {
        self.session.role == Some(role)
    }

    /// Dashboard of the current role; rules only ask this of role-bearing sessions
    fn home(&self) -> String {
        self.session.role.map(|r| r.dashboard()).unwrap_or_else(|| "/".to_string())
    }
}

/// A named predicate/outcome pair
#[derive(Clone, Copy)]
pub struct GuardRule {
    pub name: &'static str,
    pub applies: fn(&GuardContext<'_>) -> bool,
    pub outcome: fn(&GuardContext<'_>) -> Decision,
}

impl std::fmt::Debug for GuardRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardRule").field("name", &self.name).finish()
    }
}

/// Rule that fired and what it decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub rule: &'static str,
    pub decision: Decision,
}

pub const DEFAULT_DENY: &str = "default_deny";

#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<GuardRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleSet {
    pub fn new(rules: Vec<GuardRule>) -> Self {
        Self { rules }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            // Users never see business pages, whatever their token says
            GuardRule {
                name: "user_on_business_path",
                applies: |ctx| ctx.is_role(Role::User) && names_role(ctx.path, Role::Business),
                outcome: |_| Decision::Redirect("/".to_string()),
            },
            GuardRule {
                name: "user_on_business_action",
                applies: |ctx| ctx.is_role(Role::User) && ctx.routes.is_business_only(ctx.path),
                outcome: |_| Decision::Redirect("/".to_string()),
            },
            GuardRule {
                name: "signed_in_at_root",
                applies: |ctx| ctx.path == "/" && ctx.valid && ctx.session.role.is_some(),
                outcome: |ctx| Decision::Redirect(ctx.home()),
            },
            GuardRule {
                name: "public_route",
                applies: |ctx| ctx.routes.is_public(ctx.path),
                outcome: |_| Decision::Allow,
            },
            GuardRule {
                name: "invalid_token",
                applies: |ctx| !ctx.valid,
                outcome: |_| Decision::ClearAndRedirect("/".to_string()),
            },
            // A roleless session has no foreign paths
            GuardRule {
                name: "owned_or_general_path",
                applies: |ctx| match (ctx.session.role, ctx.routes.classify(ctx.path)) {
                    (None, _) => true,
                    (Some(role), RouteClass::Owned(owner)) => role == owner,
                    (Some(_), _) => true,
                },
                outcome: |_| Decision::Allow,
            },
            GuardRule {
                name: "foreign_role_path",
                applies: |_| true,
                outcome: |ctx| Decision::Redirect(ctx.home()),
            },
        ])
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name)
    }

    /// First matching rule wins; a set with no match denies
    pub fn evaluate(&self, ctx: &GuardContext<'_>) -> Verdict {
        self.rules
            .iter()
            .find(|rule| (rule.applies)(ctx))
            .map(|rule| Verdict {
                rule: rule.name,
                decision: (rule.outcome)(ctx),
            })
            .unwrap_or_else(|| Verdict {
                rule: DEFAULT_DENY,
                decision: Decision::Redirect("/".to_string()),
            })
    }
}
