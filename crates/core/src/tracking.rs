//! Time-tracking records and the wire shapes exchanged between the agent and
//! the server.
//!
//! `TimeEntry` and `Screenshot` are the payloads of the transport contract;
//! both sides serialize them with the same field names.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Time entries
// ---------------------------------------------------------------------------

/// One tracked interval of work against a task.
///
/// `end_time == None` marks the entry as open. An employee has at most one
/// open entry at any instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: DbId,
    pub employee_id: DbId,
    pub task_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
}

impl TimeEntry {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Request body for `POST /timetracking/start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTimerRequest {
    pub employee_id: DbId,
    pub task_id: DbId,
}

/// Request body for `POST /timetracking/stop`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopTimerRequest {
    pub employee_id: DbId,
}

// ---------------------------------------------------------------------------
// Screenshots
// ---------------------------------------------------------------------------

/// Proof-of-work evidence attached to a time entry. Immutable once created.
///
/// `permission_flag == false` is a permission gap: capture was attempted but
/// denied or unavailable, and `image_ref` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    pub id: DbId,
    pub time_entry_id: DbId,
    pub captured_at: Timestamp,
    pub image_ref: String,
    pub permission_flag: bool,
}

impl Screenshot {
    pub fn is_gap(&self) -> bool {
        !self.permission_flag
    }
}

/// Insert payload for a screenshot row.
#[derive(Debug, Clone)]
pub struct NewScreenshot {
    pub time_entry_id: DbId,
    pub captured_at: Timestamp,
    pub image_ref: String,
    pub permission_flag: bool,
}

// ---------------------------------------------------------------------------
// Directory views (read-only to this system)
// ---------------------------------------------------------------------------

/// Public view of the authenticated employee. Never carries the key hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: DbId,
    pub name: Option<String>,
    pub email: String,
    pub activated: bool,
}

/// A task the employee can track time against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedTask {
    pub id: DbId,
    pub name: String,
    pub project_id: DbId,
}

/// A project assigned to the employee, with its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedProject {
    pub id: DbId,
    pub name: String,
    pub tasks: Vec<AssignedTask>,
}

/// First task of the first project that has any, in listing order.
pub fn default_task(projects: &[AssignedProject]) -> Option<&AssignedTask> {
    projects.iter().find_map(|p| p.tasks.first())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn open_entry_serializes_null_end_time() {
        let entry = TimeEntry {
            id: 1,
            employee_id: 2,
            task_id: 3,
            start_time: Utc::now(),
            end_time: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["end_time"].is_null());
        assert_eq!(json["employee_id"], 2);
        assert!(entry.is_open());
    }

    #[test]
    fn default_task_skips_projects_without_tasks() {
        let projects = vec![
            AssignedProject {
                id: 1,
                name: "Empty".into(),
                tasks: vec![],
            },
            AssignedProject {
                id: 2,
                name: "Website".into(),
                tasks: vec![
                    AssignedTask {
                        id: 20,
                        name: "Default Task".into(),
                        project_id: 2,
                    },
                    AssignedTask {
                        id: 21,
                        name: "QA".into(),
                        project_id: 2,
                    },
                ],
            },
        ];
        assert_eq!(default_task(&projects).map(|t| t.id), Some(20));
        assert!(default_task(&projects[..1]).is_none());
    }
}
