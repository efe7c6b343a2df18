pub mod auth;
pub mod health;
pub mod screenshot;
pub mod timetracking;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/me                                 authenticated employee profile
/// /me/projects                             assigned projects and tasks
///
/// /timetracking/start                      open a time entry (POST)
/// /timetracking/stop                       close the open entry (POST)
/// /timetracking/active                     current open entry (GET)
/// /timetracking/{entry_id}/screenshots     evidence for an entry (GET)
///
/// /screenshots                             upload evidence (POST, multipart)
/// ```
///
/// Every route requires an `x-api-key` header.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/me", auth::me_router())
        .nest("/timetracking", timetracking::router())
        .nest("/screenshots", screenshot::router())
}
