//! Project/task rows as seen through an employee's assignments.

use sqlx::FromRow;
use worktrace_core::tracking::{AssignedProject, AssignedTask};
use worktrace_core::types::DbId;

/// One (project, task) pair from the assignment join. `task_id` is `None`
/// for an assigned project without tasks.
#[derive(Debug, Clone, FromRow)]
pub struct AssignedTaskRow {
    pub project_id: DbId,
    pub project_name: String,
    pub task_id: Option<DbId>,
    pub task_name: Option<String>,
}

/// Fold join rows (ordered by project) into projects with nested tasks.
pub fn group_assigned(rows: Vec<AssignedTaskRow>) -> Vec<AssignedProject> {
    let mut projects: Vec<AssignedProject> = Vec::new();

    for row in rows {
        if projects.last().map(|p| p.id) != Some(row.project_id) {
            projects.push(AssignedProject {
                id: row.project_id,
                name: row.project_name,
                tasks: Vec::new(),
            });
        }
        if let (Some(task_id), Some(task_name), Some(project)) =
            (row.task_id, row.task_name, projects.last_mut())
        {
            project.tasks.push(AssignedTask {
                id: task_id,
                name: task_name,
                project_id: row.project_id,
            });
        }
    }

    projects
}
