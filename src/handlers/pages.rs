// handlers/pages.rs - page payloads served behind the route guard
//
// Every handler here runs only after `route_guard` allowed the request, so
// the session it sees has already been checked for this path.

use axum::{
    extract::{Extension, OriginalUri},
    response::IntoResponse,
};
use serde::Serialize;

use crate::guard::{is_path_accessible, Validity};
use crate::middleware::{ApiResponse, GuardedSession};
use crate::session::Role;

/// Base paths whose second segment names the owning role
const ROLE_SCOPED_BASES: [&str; 4] = ["/dashboard", "/profile", "/settings", "/login"];

#[derive(Debug, Serialize)]
pub struct PageView {
    pub page: String,
    pub role: Option<Role>,
    pub signed_in: bool,
    pub role_scoped: bool,
}

impl PageView {
    fn new(path: &str, guarded: &GuardedSession) -> Self {
        let roles: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();

        Self {
            page: path.to_string(),
            role: guarded.session.role,
            signed_in: guarded.validity == Validity::Valid,
            role_scoped: is_path_accessible(path, &roles, &ROLE_SCOPED_BASES),
        }
    }
}

/// GET / - landing page for anonymous visitors
pub async fn landing(Extension(guarded): Extension<GuardedSession>) -> impl IntoResponse {
    ApiResponse::success(PageView::new("/", &guarded))
}

/// Any other page path; rendering itself is the front end's job
pub async fn page(OriginalUri(uri): OriginalUri, Extension(guarded): Extension<GuardedSession>) -> impl IntoResponse {
    ApiResponse::success(PageView::new(uri.path(), &guarded))
}
