//! Authentication extractors.
//!
//! - [`auth::AuthEmployee`] -- Resolves the employee from the `x-api-key` header.

pub mod auth;
