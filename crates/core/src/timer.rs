//! Timer state machine.
//!
//! [`TimerController`] is the only writer of `TimeEntry.end_time`. It never
//! locks anything itself: the single-open-entry invariant is enforced by the
//! store's atomic conditional insert ([`TimerStore::create_entry_if_none_open`]),
//! so several controller instances may share one store.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;

use crate::error::CoreError;
use crate::tracking::{NewScreenshot, Screenshot, TimeEntry};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Persistence contract
// ---------------------------------------------------------------------------

/// Failures reported by a [`TimerStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The employee already has an open entry; nothing was written.
    #[error("employee {employee_id} already has an open time entry")]
    Conflict { employee_id: DbId },

    /// A referenced row (employee, task or time entry) does not exist.
    #[error("{entity} {id} does not exist")]
    ForeignKeyMissing { entity: &'static str, id: DbId },

    /// Any other storage failure.
    #[error("store failure: {0}")]
    Backend(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { employee_id } => CoreError::already_tracking(employee_id),
            StoreError::ForeignKeyMissing { entity, id } => CoreError::NotFound { entity, id },
            StoreError::Backend(msg) => CoreError::Internal(msg),
        }
    }
}

/// Durable record of time entries and screenshots.
///
/// Implementations must make `create_entry_if_none_open` atomic with respect
/// to every other writer of the same store.
pub trait TimerStore: Send + Sync {
    /// The open entry for `employee_id`, most recent `start_time` first.
    fn find_open_entry(
        &self,
        employee_id: DbId,
    ) -> impl Future<Output = Result<Option<TimeEntry>, StoreError>> + Send;

    /// Look up any entry by id, open or closed.
    fn find_entry(
        &self,
        entry_id: DbId,
    ) -> impl Future<Output = Result<Option<TimeEntry>, StoreError>> + Send;

    /// Create an open entry iff the employee has none.
    ///
    /// Returns [`StoreError::Conflict`] when an open entry exists and
    /// [`StoreError::ForeignKeyMissing`] for an unknown employee or task.
    fn create_entry_if_none_open(
        &self,
        employee_id: DbId,
        task_id: DbId,
        start_time: Timestamp,
    ) -> impl Future<Output = Result<TimeEntry, StoreError>> + Send;

    /// Set `end_time` on an open entry. `None` if no open entry has that id.
    fn close_entry(
        &self,
        entry_id: DbId,
        end_time: Timestamp,
    ) -> impl Future<Output = Result<Option<TimeEntry>, StoreError>> + Send;

    /// Insert a screenshot row. [`StoreError::ForeignKeyMissing`] if the
    /// entry does not exist.
    fn create_screenshot(
        &self,
        input: &NewScreenshot,
    ) -> impl Future<Output = Result<Screenshot, StoreError>> + Send;

    /// Screenshots of an entry ordered by `captured_at`.
    fn list_screenshots(
        &self,
        entry_id: DbId,
    ) -> impl Future<Output = Result<Vec<Screenshot>, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// Controller seam
// ---------------------------------------------------------------------------

/// Start/stop transitions as seen by a session orchestrator.
///
/// Implemented in-process by [`TimerController`] and remotely by the agent's
/// HTTP client.
pub trait TimerBackend: Send + Sync {
    fn start(
        &self,
        employee_id: DbId,
        task_id: DbId,
    ) -> impl Future<Output = Result<TimeEntry, CoreError>> + Send;

    fn stop(&self, employee_id: DbId) -> impl Future<Output = Result<TimeEntry, CoreError>> + Send;
}

type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// Enforces at most one open time entry per employee.
pub struct TimerController<S> {
    store: S,
    clock: Clock,
}

impl<S: TimerStore> TimerController<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Utc::now)
    }

    /// Build a controller that reads the current time from `clock`.
    pub fn with_clock(store: S, clock: impl Fn() -> Timestamp + Send + Sync + 'static) -> Self {
        Self {
            store,
            clock: Arc::new(clock),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a new entry for `employee_id` against `task_id`.
    ///
    /// Fails with `Conflict` if one is already open, `NotFound` if the
    /// employee or task does not exist. No state changes on failure.
    pub async fn start(&self, employee_id: DbId, task_id: DbId) -> Result<TimeEntry, CoreError> {
        let now = (self.clock)();
        let entry = self
            .store
            .create_entry_if_none_open(employee_id, task_id, now)
            .await
            .map_err(|e| {
                tracing::debug!(employee_id, task_id, error = %e, "Timer start rejected");
                CoreError::from(e)
            })?;

        tracing::info!(
            employee_id,
            task_id,
            time_entry_id = entry.id,
            "Timer started"
        );
        Ok(entry)
    }

    /// Close the employee's open entry.
    ///
    /// Fails with `NotFound` when nothing is open, including when a
    /// concurrent stop closed the entry first.
    pub async fn stop(&self, employee_id: DbId) -> Result<TimeEntry, CoreError> {
        let open = self
            .store
            .find_open_entry(employee_id)
            .await?
            .ok_or_else(|| CoreError::no_open_entry(employee_id))?;

        let now = (self.clock)();
        let closed = self
            .store
            .close_entry(open.id, now)
            .await?
            .ok_or_else(|| CoreError::no_open_entry(employee_id))?;

        tracing::info!(employee_id, time_entry_id = closed.id, "Timer stopped");
        Ok(closed)
    }

    /// The employee's open entry, if any.
    pub async fn active(&self, employee_id: DbId) -> Result<Option<TimeEntry>, CoreError> {
        Ok(self.store.find_open_entry(employee_id).await?)
    }
}

impl<S: TimerStore> TimerBackend for TimerController<S> {
    async fn start(&self, employee_id: DbId, task_id: DbId) -> Result<TimeEntry, CoreError> {
        TimerController::start(self, employee_id, task_id).await
    }

    async fn stop(&self, employee_id: DbId) -> Result<TimeEntry, CoreError> {
        TimerController::stop(self, employee_id).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
