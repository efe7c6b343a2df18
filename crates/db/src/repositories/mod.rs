//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod employee_repo;
pub mod project_repo;
pub mod screenshot_repo;
pub mod time_entry_repo;

pub use employee_repo::EmployeeRepo;
pub use project_repo::ProjectRepo;
pub use screenshot_repo::ScreenshotRepo;
pub use time_entry_repo::TimeEntryRepo;
