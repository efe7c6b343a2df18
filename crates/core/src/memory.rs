//! In-process [`TimerStore`] backed by a mutex-guarded arena.
//!
//! The whole conditional insert runs under one lock acquisition, which is
//! the per-store mutual-exclusion region the controller relies on. Used by
//! tests and by single-process deployments that need no database.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::timer::{StoreError, TimerStore};
use crate::tracking::{NewScreenshot, Screenshot, TimeEntry};
use crate::types::{DbId, Timestamp};

#[derive(Default)]
struct Arena {
    employees: HashSet<DbId>,
    tasks: HashSet<DbId>,
    entries: Vec<TimeEntry>,
    screenshots: Vec<Screenshot>,
    next_entry_id: DbId,
    next_screenshot_id: DbId,
}

impl Arena {
    fn open_entry(&self, employee_id: DbId) -> Option<&TimeEntry> {
        self.entries
            .iter()
            .filter(|e| e.employee_id == employee_id && e.is_open())
            .max_by_key(|e| e.start_time)
    }
}

/// Cheaply cloneable handle; clones share the same arena.
#[derive(Clone, Default)]
pub struct InMemoryTimerStore {
    inner: Arc<Mutex<Arena>>,
}

impl InMemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `employee_id` resolvable as a foreign key.
    pub async fn register_employee(&self, employee_id: DbId) {
        self.inner.lock().await.employees.insert(employee_id);
    }

    /// Make `task_id` resolvable as a foreign key.
    pub async fn register_task(&self, task_id: DbId) {
        self.inner.lock().await.tasks.insert(task_id);
    }

    /// Drop an entry and its screenshots, as an external cleanup would.
    pub async fn remove_entry(&self, entry_id: DbId) {
        let mut arena = self.inner.lock().await;
        arena.entries.retain(|e| e.id != entry_id);
        arena.screenshots.retain(|s| s.time_entry_id != entry_id);
    }

    pub async fn entry_count(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn open_entry_count(&self, employee_id: DbId) -> usize {
        self.inner
            .lock()
            .await
            .entries
            .iter()
            .filter(|e| e.employee_id == employee_id && e.is_open())
            .count()
    }

    pub async fn screenshot_count(&self) -> usize {
        self.inner.lock().await.screenshots.len()
    }
}

impl TimerStore for InMemoryTimerStore {
    async fn find_open_entry(&self, employee_id: DbId) -> Result<Option<TimeEntry>, StoreError> {
        Ok(self.inner.lock().await.open_entry(employee_id).cloned())
    }

    async fn find_entry(&self, entry_id: DbId) -> Result<Option<TimeEntry>, StoreError> {
        let arena = self.inner.lock().await;
        Ok(arena.entries.iter().find(|e| e.id == entry_id).cloned())
    }

    async fn create_entry_if_none_open(
        &self,
        employee_id: DbId,
        task_id: DbId,
        start_time: Timestamp,
    ) -> Result<TimeEntry, StoreError> {
        let mut arena = self.inner.lock().await;

        if !arena.employees.contains(&employee_id) {
            return Err(StoreError::ForeignKeyMissing {
                entity: "Employee",
                id: employee_id,
            });
        }
        if !arena.tasks.contains(&task_id) {
            return Err(StoreError::ForeignKeyMissing {
                entity: "Task",
                id: task_id,
            });
        }
        if arena.open_entry(employee_id).is_some() {
            return Err(StoreError::Conflict { employee_id });
        }

        arena.next_entry_id += 1;
        let entry = TimeEntry {
            id: arena.next_entry_id,
            employee_id,
            task_id,
            start_time,
            end_time: None,
        };
        arena.entries.push(entry.clone());
        Ok(entry)
    }

    async fn close_entry(
        &self,
        entry_id: DbId,
        end_time: Timestamp,
    ) -> Result<Option<TimeEntry>, StoreError> {
        let mut arena = self.inner.lock().await;
        let closed = arena
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id && e.is_open())
            .map(|e| {
                e.end_time = Some(end_time);
                e.clone()
            });
        Ok(closed)
    }

    async fn create_screenshot(&self, input: &NewScreenshot) -> Result<Screenshot, StoreError> {
        let mut arena = self.inner.lock().await;

        if !arena.entries.iter().any(|e| e.id == input.time_entry_id) {
            return Err(StoreError::ForeignKeyMissing {
                entity: "TimeEntry",
                id: input.time_entry_id,
            });
        }

        arena.next_screenshot_id += 1;
        let screenshot = Screenshot {
            id: arena.next_screenshot_id,
            time_entry_id: input.time_entry_id,
            captured_at: input.captured_at,
            image_ref: input.image_ref.clone(),
            permission_flag: input.permission_flag,
        };
        arena.screenshots.push(screenshot.clone());
        Ok(screenshot)
    }

    async fn list_screenshots(&self, entry_id: DbId) -> Result<Vec<Screenshot>, StoreError> {
        let arena = self.inner.lock().await;
        let mut shots: Vec<Screenshot> = arena
            .screenshots
            .iter()
            .filter(|s| s.time_entry_id == entry_id)
            .cloned()
            .collect();
        shots.sort_by_key(|s| (s.captured_at, s.id));
        Ok(shots)
    }
}
