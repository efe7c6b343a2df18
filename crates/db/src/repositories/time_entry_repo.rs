//! Repository for the `time_entries` table.

use sqlx::PgPool;
use worktrace_core::types::{DbId, Timestamp};

use crate::models::time_entry::TimeEntryRow;

const COLUMNS: &str = "id, employee_id, task_id, start_time, end_time";

pub struct TimeEntryRepo;

impl TimeEntryRepo {
    /// The employee's open entry. Ordered by most recent start so a
    /// violated invariant still yields a deterministic row.
    pub async fn find_open_for_employee(
        pool: &PgPool,
        employee_id: DbId,
    ) -> Result<Option<TimeEntryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_entries \
             WHERE employee_id = $1 AND end_time IS NULL \
             ORDER BY start_time DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, TimeEntryRow>(&query)
            .bind(employee_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TimeEntryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM time_entries WHERE id = $1");
        sqlx::query_as::<_, TimeEntryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an open entry unless the employee already has one.
    ///
    /// A single statement against the partial unique index
    /// `uq_time_entries_open_per_employee`, so concurrent callers cannot
    /// both succeed. Returns `None` when an open entry exists.
    pub async fn create_if_none_open(
        pool: &PgPool,
        employee_id: DbId,
        task_id: DbId,
        start_time: Timestamp,
    ) -> Result<Option<TimeEntryRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO time_entries (employee_id, task_id, start_time) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (employee_id) WHERE end_time IS NULL DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntryRow>(&query)
            .bind(employee_id)
            .bind(task_id)
            .bind(start_time)
            .fetch_optional(pool)
            .await
    }

    /// Set `end_time` on an open entry. Returns `None` if the entry does not
    /// exist or is already closed.
    pub async fn close(
        pool: &PgPool,
        id: DbId,
        end_time: Timestamp,
    ) -> Result<Option<TimeEntryRow>, sqlx::Error> {
        let query = format!(
            "UPDATE time_entries SET end_time = GREATEST($2, start_time) \
             WHERE id = $1 AND end_time IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntryRow>(&query)
            .bind(id)
            .bind(end_time)
            .fetch_optional(pool)
            .await
    }
}
