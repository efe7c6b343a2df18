use crate::types::DbId;

/// Entity label used when an employee has no open time entry.
pub const OPEN_ENTRY_ENTITY: &str = "Open time entry for employee";

/// Domain-level error shared by the server and the agent.
///
/// `Conflict` and `NotFound` are the two rejections the timer state machine
/// surfaces to its callers; the remaining variants cover authentication and
/// plumbing failures.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `NotFound` for a stop request when the employee is not tracking.
    pub fn no_open_entry(employee_id: DbId) -> Self {
        CoreError::NotFound {
            entity: OPEN_ENTRY_ENTITY,
            id: employee_id,
        }
    }

    /// `Conflict` for a start request while an entry is already open.
    pub fn already_tracking(employee_id: DbId) -> Self {
        CoreError::Conflict(format!(
            "An active time entry already exists for employee {employee_id}"
        ))
    }
}
