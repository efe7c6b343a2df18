//! Handlers for the authenticated employee's own resources.

use axum::extract::State;
use axum::Json;
use worktrace_core::tracking::{AssignedProject, EmployeeProfile};
use worktrace_db::repositories::ProjectRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthEmployee;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/auth/me
pub async fn me(auth: AuthEmployee) -> Json<EmployeeProfile> {
    Json(auth.profile)
}

/// GET /api/v1/me/projects
pub async fn my_projects(
    State(state): State<AppState>,
    auth: AuthEmployee,
) -> AppResult<Json<DataResponse<Vec<AssignedProject>>>> {
    let projects = ProjectRepo::list_assigned(&state.pool, auth.employee_id).await?;
    Ok(Json(DataResponse { data: projects }))
}
