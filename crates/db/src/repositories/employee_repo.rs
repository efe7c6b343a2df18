//! Repository for the `employees` table.

use sqlx::PgPool;

use crate::models::employee::Employee;

const COLUMNS: &str = "id, name, email, api_key_hash, activated, created_at, updated_at";

/// Read-only lookups of employees.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Find an employee by the SHA-256 hash of their API key.
    pub async fn find_by_api_key_hash(
        pool: &PgPool,
        api_key_hash: &str,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE api_key_hash = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(api_key_hash)
            .fetch_optional(pool)
            .await
    }
}
