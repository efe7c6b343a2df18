//! Route definitions for the `/timetracking` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::timetracking;
use crate::state::AppState;

/// Routes mounted at `/timetracking`.
///
/// ```text
/// POST   /start                         -> start
/// POST   /stop                          -> stop
/// GET    /active                        -> active
/// GET    /{entry_id}/screenshots        -> list_screenshots
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(timetracking::start))
        .route("/stop", post(timetracking::stop))
        .route("/active", get(timetracking::active))
        .route(
            "/{entry_id}/screenshots",
            get(timetracking::list_screenshots),
        )
}
