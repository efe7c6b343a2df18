//! Handlers for the `/timetracking` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use worktrace_core::error::CoreError;
use worktrace_core::timer::TimerStore;
use worktrace_core::tracking::{Screenshot, StartTimerRequest, StopTimerRequest, TimeEntry};
use worktrace_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthEmployee;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/timetracking/start
pub async fn start(
    State(state): State<AppState>,
    auth: AuthEmployee,
    Json(input): Json<StartTimerRequest>,
) -> AppResult<(StatusCode, Json<TimeEntry>)> {
    auth.ensure_self(input.employee_id)?;
    let entry = state.timer.start(input.employee_id, input.task_id).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST /api/v1/timetracking/stop
pub async fn stop(
    State(state): State<AppState>,
    auth: AuthEmployee,
    Json(input): Json<StopTimerRequest>,
) -> AppResult<Json<TimeEntry>> {
    auth.ensure_self(input.employee_id)?;
    let entry = state.timer.stop(input.employee_id).await?;
    Ok(Json(entry))
}

/// GET /api/v1/timetracking/active
pub async fn active(
    State(state): State<AppState>,
    auth: AuthEmployee,
) -> AppResult<Json<Option<TimeEntry>>> {
    let entry = state.timer.active(auth.employee_id).await?;
    Ok(Json(entry))
}

/// GET /api/v1/timetracking/{entry_id}/screenshots
pub async fn list_screenshots(
    State(state): State<AppState>,
    auth: AuthEmployee,
    Path(entry_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Screenshot>>>> {
    let store = state.timer.store();
    owned_entry(store, &auth, entry_id).await?;
    let screenshots = store.list_screenshots(entry_id).await.map_err(CoreError::from)?;
    Ok(Json(DataResponse { data: screenshots }))
}

/// Load an entry and check that it belongs to the caller.
pub(crate) async fn owned_entry<S: TimerStore>(
    store: &S,
    auth: &AuthEmployee,
    entry_id: DbId,
) -> AppResult<TimeEntry> {
    let entry = store
        .find_entry(entry_id)
        .await
        .map_err(CoreError::from)?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimeEntry",
            id: entry_id,
        }))?;
    if entry.employee_id != auth.employee_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Time entry belongs to another employee".into(),
        )));
    }
    Ok(entry)
}
