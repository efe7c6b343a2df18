//! Shared response envelope types for API handlers.
//!
//! List endpoints use a `{ "data": [...] }` envelope; single resources are
//! returned bare so the agent can deserialize `TimeEntry` directly.

use serde::{Deserialize, Serialize};

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}
