//! PostgreSQL implementation of the timer persistence contract.

use worktrace_core::timer::{StoreError, TimerStore};
use worktrace_core::tracking::{NewScreenshot, Screenshot, TimeEntry};
use worktrace_core::types::{DbId, Timestamp};

use crate::repositories::{ScreenshotRepo, TimeEntryRepo};
use crate::DbPool;

/// PostgreSQL foreign-key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// [`TimerStore`] over a connection pool. Cheap to clone.
#[derive(Clone)]
pub struct PgTimerStore {
    pool: DbPool,
}

impl PgTimerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Name of the violated foreign-key constraint, if `err` is one.
fn violated_foreign_key(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            Some(db_err.constraint().unwrap_or("unknown").to_string())
        }
        _ => None,
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Timer store query failed");
    StoreError::Backend(err.to_string())
}

impl TimerStore for PgTimerStore {
    async fn find_open_entry(&self, employee_id: DbId) -> Result<Option<TimeEntry>, StoreError> {
        let row = TimeEntryRepo::find_open_for_employee(&self.pool, employee_id)
            .await
            .map_err(backend)?;
        Ok(row.map(Into::into))
    }

    async fn find_entry(&self, entry_id: DbId) -> Result<Option<TimeEntry>, StoreError> {
        let row = TimeEntryRepo::find_by_id(&self.pool, entry_id)
            .await
            .map_err(backend)?;
        Ok(row.map(Into::into))
    }

    async fn create_entry_if_none_open(
        &self,
        employee_id: DbId,
        task_id: DbId,
        start_time: Timestamp,
    ) -> Result<TimeEntry, StoreError> {
        match TimeEntryRepo::create_if_none_open(&self.pool, employee_id, task_id, start_time).await
        {
            Ok(Some(row)) => Ok(row.into()),
            Ok(None) => Err(StoreError::Conflict { employee_id }),
            Err(e) => match violated_foreign_key(&e).as_deref() {
                Some("fk_time_entries_employee") => Err(StoreError::ForeignKeyMissing {
                    entity: "Employee",
                    id: employee_id,
                }),
                Some(_) => Err(StoreError::ForeignKeyMissing {
                    entity: "Task",
                    id: task_id,
                }),
                None => Err(backend(e)),
            },
        }
    }

    async fn close_entry(
        &self,
        entry_id: DbId,
        end_time: Timestamp,
    ) -> Result<Option<TimeEntry>, StoreError> {
        let row = TimeEntryRepo::close(&self.pool, entry_id, end_time)
            .await
            .map_err(backend)?;
        Ok(row.map(Into::into))
    }

    async fn create_screenshot(&self, input: &NewScreenshot) -> Result<Screenshot, StoreError> {
        match ScreenshotRepo::create(&self.pool, input).await {
            Ok(row) => Ok(row.into()),
            Err(e) if violated_foreign_key(&e).is_some() => Err(StoreError::ForeignKeyMissing {
                entity: "TimeEntry",
                id: input.time_entry_id,
            }),
            Err(e) => Err(backend(e)),
        }
    }

    async fn list_screenshots(&self, entry_id: DbId) -> Result<Vec<Screenshot>, StoreError> {
        let rows = ScreenshotRepo::list_by_time_entry(&self.pool, entry_id)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
