//! Repository for the `screenshots` table. Rows are insert-only.

use sqlx::PgPool;
use worktrace_core::tracking::NewScreenshot;
use worktrace_core::types::DbId;

use crate::models::time_entry::ScreenshotRow;

const COLUMNS: &str = "id, time_entry_id, captured_at, image_ref, permission_flag";

pub struct ScreenshotRepo;

impl ScreenshotRepo {
    pub async fn create(pool: &PgPool, input: &NewScreenshot) -> Result<ScreenshotRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO screenshots (time_entry_id, captured_at, image_ref, permission_flag) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScreenshotRow>(&query)
            .bind(input.time_entry_id)
            .bind(input.captured_at)
            .bind(&input.image_ref)
            .bind(input.permission_flag)
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_time_entry(
        pool: &PgPool,
        time_entry_id: DbId,
    ) -> Result<Vec<ScreenshotRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM screenshots \
             WHERE time_entry_id = $1 \
             ORDER BY captured_at, id"
        );
        sqlx::query_as::<_, ScreenshotRow>(&query)
            .bind(time_entry_id)
            .fetch_all(pool)
            .await
    }
}
