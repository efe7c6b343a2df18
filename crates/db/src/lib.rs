//! PostgreSQL persistence boundary.
//!
//! Row models live in [`models`], query code in [`repositories`], and
//! [`timer_store::PgTimerStore`] adapts them to the
//! [`TimerStore`](worktrace_core::timer::TimerStore) contract.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod timer_store;

pub use timer_store::PgTimerStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
