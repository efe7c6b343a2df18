//! Periodic screenshot capture bound to one open time entry.
//!
//! [`ScreenshotScheduler::bind`] spawns a loop that ticks immediately and
//! then once per [`SchedulerConfig::period`], measured from the end of the
//! previous tick so ticks never overlap. [`ScreenshotScheduler::unbind`]
//! cancels the loop: no tick starts after it returns, while a tick already
//! in flight finishes its upload and then exits without re-arming.
//!
//! A tick never fails. Capture problems become permission gaps and upload
//! problems are logged and dropped, so the loop keeps running until unbound.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use worktrace_core::evidence::EvidenceUpload;
use worktrace_core::types::DbId;

use crate::capture::CaptureProvider;
use crate::config::SchedulerConfig;
use crate::uploader::EvidenceUploader;

/// Result of one tick, for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// An image was captured and stored.
    Captured { screenshot_id: DbId },
    /// Capture was denied or failed; a gap record was stored.
    Gap { screenshot_id: DbId },
    /// The upload failed; nothing was stored for this tick.
    UploadFailed,
}

/// Capture and upload collaborators shared by the loop task.
struct Tick {
    capture: Arc<dyn CaptureProvider>,
    uploader: Arc<dyn EvidenceUploader>,
}

impl Tick {
    async fn run(&self, time_entry_id: DbId) -> TickOutcome {
        let upload = self.capture(time_entry_id).await;
        let permitted = upload.permission_flag;

        match self.uploader.upload(upload).await {
            Ok(screenshot) if permitted => TickOutcome::Captured {
                screenshot_id: screenshot.id,
            },
            Ok(screenshot) => TickOutcome::Gap {
                screenshot_id: screenshot.id,
            },
            Err(e) if e.is_missing_entry() => {
                tracing::warn!(time_entry_id, error = %e, "Screenshot dropped: entry is gone");
                TickOutcome::UploadFailed
            }
            Err(e) => {
                tracing::error!(time_entry_id, error = %e, "Screenshot upload failed");
                TickOutcome::UploadFailed
            }
        }
    }

    /// Steps 1 and 2 of a tick: resolve a source, then encode a still.
    async fn capture(&self, time_entry_id: DbId) -> EvidenceUpload {
        let Some(source) = self.capture.acquire_source_id().await else {
            tracing::warn!(time_entry_id, "No capture source available; recording gap");
            return EvidenceUpload::gap(time_entry_id, Utc::now());
        };

        let captured_at = Utc::now();
        match self.capture.capture_still(&source).await {
            Ok(image) => EvidenceUpload::captured(time_entry_id, captured_at, image),
            Err(e) => {
                tracing::warn!(time_entry_id, %source, error = %e, "Capture failed; recording gap");
                EvidenceUpload::gap(time_entry_id, captured_at)
            }
        }
    }
}

struct Binding {
    time_entry_id: DbId,
    cancel: CancellationToken,
}

/// Recurring capture loop for a single open time entry.
///
/// Dropping the scheduler unbinds it.
pub struct ScreenshotScheduler {
    tick: Arc<Tick>,
    config: SchedulerConfig,
    binding: Option<Binding>,
}

impl ScreenshotScheduler {
    pub fn new(
        capture: Arc<dyn CaptureProvider>,
        uploader: Arc<dyn EvidenceUploader>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            tick: Arc::new(Tick { capture, uploader }),
            config,
            binding: None,
        }
    }

    /// The entry the loop is currently bound to.
    pub fn bound_entry(&self) -> Option<DbId> {
        self.binding.as_ref().map(|b| b.time_entry_id)
    }

    /// Start ticking for `time_entry_id`: once now, then every period.
    ///
    /// Rebinding first unbinds the previous entry.
    pub fn bind(&mut self, time_entry_id: DbId) {
        self.unbind();

        let cancel = CancellationToken::new();
        let tick = Arc::clone(&self.tick);
        let period = self.config.period;
        let token = cancel.clone();

        tokio::spawn(async move {
            tracing::debug!(time_entry_id, ?period, "Screenshot loop started");
            loop {
                if token.is_cancelled() {
                    break;
                }
                let outcome = tick.run(time_entry_id).await;
                tracing::debug!(time_entry_id, ?outcome, "Screenshot tick finished");

                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(period) => {}
                }
            }
            tracing::debug!(time_entry_id, "Screenshot loop stopped");
        });

        self.binding = Some(Binding {
            time_entry_id,
            cancel,
        });
        tracing::info!(time_entry_id, "Screenshot scheduler bound");
    }

    /// Stop ticking. Safe to call when already unbound.
    pub fn unbind(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.cancel.cancel();
            tracing::info!(
                time_entry_id = binding.time_entry_id,
                "Screenshot scheduler unbound"
            );
        }
    }

    /// Run one capture-and-upload cycle for the bound entry, outside the
    /// loop. `None` when unbound. May overlap a loop tick.
    #[cfg(test)]
    pub(crate) async fn tick(&self) -> Option<TickOutcome> {
        let time_entry_id = self.bound_entry()?;
        Some(self.tick.run(time_entry_id).await)
    }
}

impl Drop for ScreenshotScheduler {
    fn drop(&mut self) {
        self.unbind();
    }
}
