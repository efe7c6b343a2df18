//! Route definitions for the authenticated employee.

use axum::routing::get;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// GET    /me                 -> me
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(auth::me))
}

/// Routes mounted at `/me`.
///
/// ```text
/// GET    /projects           -> my_projects
/// ```
pub fn me_router() -> Router<AppState> {
    Router::new().route("/projects", get(auth::my_projects))
}
