//! Handler for screenshot evidence uploads.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use worktrace_core::error::CoreError;
use worktrace_core::evidence::{record_evidence, EvidenceUpload};
use worktrace_core::tracking::Screenshot;
use worktrace_core::types::{DbId, Timestamp};

use crate::error::{AppError, AppResult};
use crate::handlers::timetracking::owned_entry;
use crate::middleware::auth::AuthEmployee;
use crate::state::AppState;

/// Fields collected from the multipart form before validation.
#[derive(Default)]
struct ScreenshotForm {
    time_entry_id: Option<DbId>,
    permission_flag: Option<bool>,
    captured_at: Option<Timestamp>,
    image: Option<Vec<u8>>,
}

/// POST /api/v1/screenshots
///
/// Accepts a multipart form with `time_entry_id`, `permission_flag`, an
/// optional RFC 3339 `captured_at` and, when permission was granted, an
/// `image` part holding a PNG or JPEG still. A denied capture is recorded
/// as a gap with no image.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthEmployee,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Screenshot>)> {
    let max_bytes = state.config.max_screenshot_bytes;
    let mut form = ScreenshotForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let mut data = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                {
                    if data.len() + chunk.len() > max_bytes {
                        return Err(AppError::BadRequest(format!(
                            "Screenshot exceeds the {max_bytes} byte limit"
                        )));
                    }
                    data.extend_from_slice(&chunk);
                }
                form.image = Some(data);
            }
            "time_entry_id" => {
                let text = field_text(field).await?;
                form.time_entry_id = Some(text.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("Invalid time_entry_id '{text}'"))
                })?);
            }
            "permission_flag" => {
                let text = field_text(field).await?;
                form.permission_flag = Some(text.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("Invalid permission_flag '{text}'"))
                })?);
            }
            "captured_at" => {
                let text = field_text(field).await?;
                let parsed = DateTime::parse_from_rfc3339(text.trim()).map_err(|_| {
                    AppError::BadRequest(format!("Invalid captured_at '{text}'"))
                })?;
                form.captured_at = Some(parsed.with_timezone(&Utc));
            }
            _ => {} // ignore unknown fields
        }
    }

    let time_entry_id = form
        .time_entry_id
        .ok_or_else(|| AppError::BadRequest("Missing required 'time_entry_id' field".into()))?;
    let permission_flag = form
        .permission_flag
        .ok_or_else(|| AppError::BadRequest("Missing required 'permission_flag' field".into()))?;

    owned_entry(state.timer.store(), &auth, time_entry_id).await?;

    let upload = EvidenceUpload {
        time_entry_id,
        captured_at: form.captured_at.unwrap_or_else(Utc::now),
        image: if permission_flag { form.image } else { None },
        permission_flag,
    };

    let screenshot = record_evidence(state.timer.store(), &state.evidence, upload)
        .await
        .map_err(CoreError::from)?;

    tracing::debug!(
        time_entry_id,
        screenshot_id = screenshot.id,
        gap = screenshot.is_gap(),
        "Screenshot recorded"
    );
    Ok((StatusCode::CREATED, Json(screenshot)))
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}
