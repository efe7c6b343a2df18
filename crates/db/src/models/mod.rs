//! Row structs matching the database tables.
//!
//! Each `FromRow` struct converts into the wire type defined in
//! `worktrace_core::tracking`, so the API never serializes rows directly.

pub mod employee;
pub mod project;
pub mod time_entry;
