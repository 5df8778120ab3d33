use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::guard::{Decision, Validity};
use crate::session::{CookieSession, Session, SessionStore};
use crate::state::AppState;

/// Session that passed the guard, available to page handlers
#[derive(Clone, Debug)]
pub struct GuardedSession {
    pub session: Session,
    pub validity: Validity,
}

/// Route guard middleware for page routes.
///
/// Each request is one guard cycle: the session comes from cookies, the
/// token is validated once, and any redirect is a `303 See Other` so the
/// browser replaces the request rather than stacking history entries.
pub async fn route_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let store = CookieSession::from_headers(request.headers(), state.cookie_secure());
    let session = store.load();

    let (validity, verdict) = state.guard.evaluate(&path, &session).await;

    match verdict.decision {
        Decision::Allow => {
            request.extensions_mut().insert(GuardedSession { session, validity });
            next.run(request).await
        }
        Decision::Redirect(target) => {
            tracing::info!("Redirecting {} -> {} ({})", path, target, verdict.rule);
            Redirect::to(&target).into_response()
        }
        Decision::ClearAndRedirect(target) => {
            tracing::info!("Signing out stale session on {} -> {}", path, target);
            store.clear();
            let mut response = Redirect::to(&target).into_response();
            store.apply(&mut response);
            response
        }
    }
}
