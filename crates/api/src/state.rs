use std::sync::Arc;

use worktrace_core::evidence::EvidenceStorage;
use worktrace_core::timer::TimerController;
use worktrace_db::PgTimerStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: worktrace_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Timer state machine over the shared store.
    pub timer: Arc<TimerController<PgTimerStore>>,
    /// Screenshot image directory.
    pub evidence: EvidenceStorage,
}

impl AppState {
    pub fn new(pool: worktrace_db::DbPool, config: ServerConfig) -> Self {
        let timer = TimerController::new(PgTimerStore::new(pool.clone()));
        let evidence = EvidenceStorage::new(&config.screenshot_dir);
        Self {
            pool,
            config: Arc::new(config),
            timer: Arc::new(timer),
            evidence,
        }
    }
}
