//! Path classification for the route guard.
//!
//! Role ownership is decided per path segment: `/dashboard/business` is owned
//! by `business`, while `/userbusiness-report` names no role at all.

use crate::session::Role;

/// Pages reachable without a valid session (exact, case-sensitive)
pub const PUBLIC_ROUTES: [&str; 5] = ["/", "/register", "/login/business", "/recovery", "/auth/callbackv1"];

/// True iff `current_path` starts with `{base}/{role}` for some base path
/// and some role. Literal prefix match, no segment or wildcard handling.
pub fn is_path_accessible(current_path: &str, roles: &[&str], base_paths: &[&str]) -> bool {
    base_paths.iter().any(|base| {
        roles
            .iter()
            .any(|role| current_path.starts_with(&format!("{}/{}", base, role)))
    })
}

pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Whether any segment of `path` is the role's label
pub fn names_role(path: &str, role: Role) -> bool {
    segments(path).any(|segment| segment == role.as_str())
}

/// How a path relates to the two roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Owned(Role),
    /// Names both roles; only rule order decides
    Ambiguous,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Literal(String),
    Param,
}

/// A declared route: either a literal path or a segment pattern with dynamic
/// segments written `[name]` or `:name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Option<Vec<PatternSegment>>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Self {
        let parsed: Vec<PatternSegment> = segments(raw)
            .map(|s| {
                if s.starts_with(':') || (s.starts_with('[') && s.ends_with(']')) {
                    PatternSegment::Param
                } else {
                    PatternSegment::Literal(s.to_string())
                }
            })
            .collect();

        let has_params = parsed.iter().any(|s| *s == PatternSegment::Param);

        Self {
            raw: raw.to_string(),
            segments: has_params.then_some(parsed),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        let Some(pattern) = &self.segments else {
            return self.raw == path;
        };

        let mut actual = segments(path);
        for expected in pattern {
            match (expected, actual.next()) {
                (PatternSegment::Param, Some(_)) => {}
                (PatternSegment::Literal(lit), Some(seg)) if lit == seg => {}
                _ => return false,
            }
        }
        actual.next().is_none()
    }
}

/// Declared routes consulted by the guard rules
#[derive(Debug, Clone)]
pub struct RouteTable {
    public: Vec<RoutePattern>,
    business_only: Vec<RoutePattern>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RouteTable {
    /// The compiled-in public allow-list and no business-only actions
    pub fn standard() -> Self {
        Self {
            public: PUBLIC_ROUTES.iter().map(|p| RoutePattern::parse(p)).collect(),
            business_only: Vec::new(),
        }
    }

    /// Pages that edit or create listings; users are bounced from these
    pub fn with_business_only<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.business_only = patterns.into_iter().map(|p| RoutePattern::parse(p.as_ref())).collect();
        self
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|p| p.matches(path))
    }

    pub fn is_business_only(&self, path: &str) -> bool {
        self.business_only.iter().any(|p| p.matches(path))
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.is_public(path) {
            return RouteClass::Public;
        }

        match (names_role(path, Role::User), names_role(path, Role::Business)) {
            (true, true) => RouteClass::Ambiguous,
            (true, false) => RouteClass::Owned(Role::User),
            (false, true) => RouteClass::Owned(Role::Business),
            (false, false) => RouteClass::General,
        }
    }
}
