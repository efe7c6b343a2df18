//! Repository for projects and tasks reachable through `project_assignments`.

use sqlx::PgPool;
use worktrace_core::tracking::AssignedProject;
use worktrace_core::types::DbId;

use crate::models::project::{group_assigned, AssignedTaskRow};

pub struct ProjectRepo;

impl ProjectRepo {
    /// Projects assigned to `employee_id` with their tasks, oldest project
    /// first and tasks in creation order.
    pub async fn list_assigned(
        pool: &PgPool,
        employee_id: DbId,
    ) -> Result<Vec<AssignedProject>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AssignedTaskRow>(
            "SELECT p.id AS project_id, p.name AS project_name, \
                    t.id AS task_id, t.name AS task_name \
             FROM project_assignments pa \
             JOIN projects p ON p.id = pa.project_id \
             LEFT JOIN tasks t ON t.project_id = p.id \
             WHERE pa.employee_id = $1 \
             ORDER BY p.created_at, p.id, t.created_at, t.id",
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await?;

        Ok(group_assigned(rows))
    }
}
