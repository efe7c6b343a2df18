//! Session orchestration: one open time entry plus its screenshot loop.
//!
//! Per employee the session is either idle or tracking. Tracking means the
//! timer backend holds exactly one open entry for the employee and exactly
//! one bound [`ScreenshotScheduler`] ticks against it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use worktrace_core::error::CoreError;
use worktrace_core::timer::TimerBackend;
use worktrace_core::tracking::TimeEntry;
use worktrace_core::types::DbId;

use crate::capture::CaptureProvider;
use crate::config::SchedulerConfig;
use crate::scheduler::ScreenshotScheduler;
use crate::uploader::EvidenceUploader;

/// The scheduler slot for one employee. Holding its lock serialises that
/// employee's start and stop.
type Slot = Arc<Mutex<Option<ScreenshotScheduler>>>;

/// Starts and stops timer sessions together with their screenshot loops.
pub struct SessionOrchestrator<T> {
    timer: T,
    capture: Arc<dyn CaptureProvider>,
    uploader: Arc<dyn EvidenceUploader>,
    config: SchedulerConfig,
    sessions: Mutex<HashMap<DbId, Slot>>,
}

impl<T: TimerBackend> SessionOrchestrator<T> {
    pub fn new(
        timer: T,
        capture: Arc<dyn CaptureProvider>,
        uploader: Arc<dyn EvidenceUploader>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            timer,
            capture,
            uploader,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    async fn slot(&self, employee_id: DbId) -> Slot {
        Arc::clone(self.sessions.lock().await.entry(employee_id).or_default())
    }

    /// Start the timer, then bind a scheduler to the new entry.
    ///
    /// When the timer refuses to start nothing is bound and any existing
    /// session for the employee is left untouched. A concurrent
    /// [`stop_session`](Self::stop_session) for the same employee waits
    /// until the scheduler is bound.
    pub async fn start_session(&self, employee_id: DbId, task_id: DbId) -> Result<TimeEntry, CoreError> {
        let slot = self.slot(employee_id).await;
        let mut session = slot.lock().await;

        let entry = self.timer.start(employee_id, task_id).await?;

        let mut scheduler = ScreenshotScheduler::new(
            Arc::clone(&self.capture),
            Arc::clone(&self.uploader),
            self.config,
        );
        scheduler.bind(entry.id);

        if let Some(stale) = session.replace(scheduler) {
            tracing::warn!(
                employee_id,
                stale_entry = ?stale.bound_entry(),
                "Replaced a stale screenshot scheduler"
            );
        }

        tracing::info!(employee_id, task_id, time_entry_id = entry.id, "Session started");
        Ok(entry)
    }

    /// Unbind the employee's scheduler, then stop the timer.
    ///
    /// Unbinding first means no new tick can reference the entry being
    /// closed. The unbind happens even when the stop is rejected.
    pub async fn stop_session(&self, employee_id: DbId) -> Result<TimeEntry, CoreError> {
        let slot = self.slot(employee_id).await;
        let mut session = slot.lock().await;

        if let Some(mut scheduler) = session.take() {
            scheduler.unbind();
        }

        let entry = self.timer.stop(employee_id).await?;
        tracing::info!(employee_id, time_entry_id = entry.id, "Session stopped");
        Ok(entry)
    }

    /// The entry the employee's scheduler is bound to, if tracking.
    pub async fn tracked_entry(&self, employee_id: DbId) -> Option<DbId> {
        let slot = self.sessions.lock().await.get(&employee_id).cloned()?;
        let session = slot.lock().await;
        session.as_ref().and_then(ScreenshotScheduler::bound_entry)
    }

    /// Stop every tracked session. Used on shutdown.
    pub async fn stop_all(&self) -> Vec<(DbId, Result<TimeEntry, CoreError>)> {
        let slots: Vec<(DbId, Slot)> = self
            .sessions
            .lock()
            .await
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();

        let mut results = Vec::new();
        for (employee_id, slot) in slots {
            if slot.lock().await.is_none() {
                continue;
            }
            results.push((employee_id, self.stop_session(employee_id).await));
        }
        results
    }
}
