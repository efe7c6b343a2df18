//! API-key authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use worktrace_core::api_keys::{hash_api_key, API_KEY_HEADER};
use worktrace_core::error::CoreError;
use worktrace_core::tracking::EmployeeProfile;
use worktrace_core::types::DbId;
use worktrace_db::repositories::EmployeeRepo;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated employee resolved from the `x-api-key` header.
///
/// Use this as an extractor parameter in any handler that requires an
/// employee:
///
/// ```ignore
/// async fn my_handler(auth: AuthEmployee) -> AppResult<Json<()>> {
///     tracing::info!(employee_id = auth.employee_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthEmployee {
    pub employee_id: DbId,
    pub profile: EmployeeProfile,
}

impl AuthEmployee {
    /// Reject requests that act on behalf of a different employee.
    pub fn ensure_self(&self, employee_id: DbId) -> Result<(), AppError> {
        if employee_id == self.employee_id {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "API key does not belong to this employee".into(),
            )))
        }
    }
}

impl FromRequestParts<AppState> for AuthEmployee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing x-api-key header".into()))
            })?;

        let employee = EmployeeRepo::find_by_api_key_hash(&state.pool, &hash_api_key(key))
            .await?
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid API key".into())))?;

        if !employee.activated {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is not activated".into(),
            )));
        }

        Ok(AuthEmployee {
            employee_id: employee.id,
            profile: employee.into(),
        })
    }
}
