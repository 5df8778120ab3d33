use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use cookie::{time::Duration, Cookie, SameSite};
use std::collections::HashMap;
use std::sync::Mutex;

use super::{SessionStore, JWT_KEY, ROLE_KEY};

/// Session persisted in browser cookies.
///
/// Reads come from the request's `Cookie` header (falling back to a bearer
/// `Authorization` header for the token); writes are queued and emitted as
/// `Set-Cookie` headers on the response.
#[derive(Debug)]
pub struct CookieSession {
    values: Mutex<HashMap<String, String>>,
    pending: Mutex<Vec<(String, String)>>,
    secure: bool,
}

impl CookieSession {
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        let mut values = HashMap::new();

        for raw in headers.get_all(header::COOKIE) {
            let Ok(raw) = raw.to_str() else {
                tracing::debug!("Skipping non-ASCII cookie header");
                continue;
            };
            for parsed in Cookie::split_parse_encoded(raw) {
                match parsed {
                    Ok(cookie) => {
                        values.insert(cookie.name().to_string(), cookie.value_trimmed().to_string());
                    }
                    Err(e) => tracing::debug!("Skipping malformed cookie: {}", e),
                }
            }
        }

        if values.get(JWT_KEY).map_or(true, |v| v.is_empty()) {
            if let Some(token) = bearer_token(headers) {
                values.insert(JWT_KEY.to_string(), token);
            }
        }

        Self {
            values: Mutex::new(values),
            pending: Mutex::new(Vec::new()),
            secure,
        }
    }

    /// An empty session whose writes still produce cookies
    pub fn empty(secure: bool) -> Self {
        Self::from_headers(&HeaderMap::new(), secure)
    }

    /// `Set-Cookie` values for every write since the session was read
    pub fn set_cookie_headers(&self) -> Vec<HeaderValue> {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending
            .iter()
            .filter_map(|(name, value)| {
                let cookie = self.render_cookie(name, value);
                match HeaderValue::from_str(&cookie) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        tracing::warn!("Dropping unencodable cookie '{}': {}", name, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Append the queued cookie writes to a response
    pub fn apply(&self, response: &mut Response) {
        for value in self.set_cookie_headers() {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    fn render_cookie(&self, name: &str, value: &str) -> String {
        let mut cookie = Cookie::build((name.to_string(), value.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            // The role label is read by page scripts; credentials are not
            .http_only(name != ROLE_KEY)
            .secure(self.secure);
        if value.is_empty() {
            cookie = cookie.max_age(Duration::ZERO);
        }
        cookie.build().encoded().to_string()
    }
}

impl SessionStore for CookieSession {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        {
            let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
            values.insert(key.to_string(), value.to_string());
        }
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|(name, _)| name != key);
        pending.push((key.to_string(), value.to_string()));
    }
}

/// Extract a bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, Session, REFRESH_TOKEN_KEY};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_reads_session_from_cookie_header() {
        let session = CookieSession::from_headers(
            &headers(&[("cookie", "theme=dark; jwt=t1; role=user")]),
            false,
        );
        assert_eq!(session.load(), Session::new("t1", Some(Role::User)));
    }

    #[test]
    fn test_bearer_header_fills_missing_token() {
        let session = CookieSession::from_headers(
            &headers(&[("authorization", "Bearer t9"), ("cookie", "role=business")]),
            false,
        );
        assert_eq!(session.load(), Session::new("t9", Some(Role::Business)));
    }

    #[test]
    fn test_cookie_token_wins_over_bearer() {
        let session = CookieSession::from_headers(
            &headers(&[("authorization", "Bearer other"), ("cookie", "jwt=t1")]),
            false,
        );
        assert_eq!(session.get(JWT_KEY).as_deref(), Some("t1"));
    }

    #[test]
    fn test_clear_emits_expiring_cookies() {
        let session = CookieSession::from_headers(&headers(&[("cookie", "jwt=t1; role=user")]), true);
        session.clear();

        let cookies: Vec<String> = session
            .set_cookie_headers()
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("jwt=;"));
        assert!(cookies[0].contains("Path=/"));
        assert!(cookies[0].contains("SameSite=Lax"));
        assert!(cookies[0].contains("HttpOnly"));
        assert!(cookies[0].contains("Secure"));
        assert!(cookies[0].contains("Max-Age=0"));
        assert!(cookies[1].starts_with("role=;"));
        assert!(!cookies[1].contains("HttpOnly"));
        assert_eq!(session.load(), Session::anonymous());
    }

    #[test]
    fn test_repeated_writes_keep_last_value() {
        let session = CookieSession::empty(false);
        session.store("a", Role::User, Some("r"));
        session.set(JWT_KEY, "b");

        let cookies = session.set_cookie_headers();
        assert_eq!(cookies.len(), 3);
        let rendered: Vec<&str> = cookies.iter().map(|v| v.to_str().unwrap()).collect();
        assert!(rendered.iter().any(|c| c.starts_with("jwt=b;")));
        assert!(rendered.iter().any(|c| c.starts_with(&format!("{}=r;", REFRESH_TOKEN_KEY))));
    }

    #[test]
    fn test_decodes_encoded_and_quoted_values() {
        let session = CookieSession::from_headers(
            &headers(&[("cookie", "jwt=a%2Eb%20c; role=\"business\"; broken")]),
            false,
        );
        assert_eq!(session.get(JWT_KEY).as_deref(), Some("a.b c"));
        assert_eq!(session.load().role, Some(Role::Business));
    }

    #[test]
    fn test_written_values_are_encoded() {
        let session = CookieSession::empty(false);
        session.set(JWT_KEY, "a b;c");

        let cookies = session.set_cookie_headers();
        let rendered = cookies[0].to_str().unwrap();
        assert!(rendered.starts_with("jwt=a%20b%3Bc;"), "{}", rendered);
    }
}
