//! Employee row model.

use sqlx::FromRow;
use worktrace_core::tracking::EmployeeProfile;
use worktrace_core::types::{DbId, Timestamp};

/// A row from the `employees` table. Responses use [`EmployeeProfile`],
/// which omits `api_key_hash`.
#[derive(Debug, Clone, FromRow)]
pub struct Employee {
    pub id: DbId,
    pub name: Option<String>,
    pub email: String,
    pub api_key_hash: String,
    pub activated: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Employee> for EmployeeProfile {
    fn from(row: Employee) -> Self {
        EmployeeProfile {
            id: row.id,
            name: row.name,
            email: row.email,
            activated: row.activated,
        }
    }
}
