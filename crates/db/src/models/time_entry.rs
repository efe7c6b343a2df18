//! Time entry and screenshot rows.

use sqlx::FromRow;
use worktrace_core::tracking::{Screenshot, TimeEntry};
use worktrace_core::types::{DbId, Timestamp};

/// A row from the `time_entries` table.
#[derive(Debug, Clone, FromRow)]
pub struct TimeEntryRow {
    pub id: DbId,
    pub employee_id: DbId,
    pub task_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
}

impl From<TimeEntryRow> for TimeEntry {
    fn from(row: TimeEntryRow) -> Self {
        TimeEntry {
            id: row.id,
            employee_id: row.employee_id,
            task_id: row.task_id,
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

/// A row from the `screenshots` table.
#[derive(Debug, Clone, FromRow)]
pub struct ScreenshotRow {
    pub id: DbId,
    pub time_entry_id: DbId,
    pub captured_at: Timestamp,
    pub image_ref: String,
    pub permission_flag: bool,
}

impl From<ScreenshotRow> for Screenshot {
    fn from(row: ScreenshotRow) -> Self {
        Screenshot {
            id: row.id,
            time_entry_id: row.time_entry_id,
            captured_at: row.captured_at,
            image_ref: row.image_ref,
            permission_flag: row.permission_flag,
        }
    }
}
