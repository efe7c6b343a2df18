//! Route definitions for the `/screenshots` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::screenshot;
use crate::state::AppState;

/// Routes mounted at `/screenshots`.
///
/// The default body limit is lifted here; the handler enforces
/// `max_screenshot_bytes` on the image part itself.
///
/// ```text
/// POST   /                      -> upload (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(screenshot::upload))
        .layer(DefaultBodyLimit::disable())
}
