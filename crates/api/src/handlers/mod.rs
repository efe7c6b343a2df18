pub mod auth;
pub mod screenshot;
pub mod timetracking;
