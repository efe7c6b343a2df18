//! Domain layer for worktrace.
//!
//! Holds the timer state machine, the persistence contract it relies on,
//! and the evidence types shared by the server and the desktop agent.
//! This crate has no internal dependencies.

pub mod api_keys;
pub mod error;
pub mod evidence;
pub mod memory;
pub mod timer;
pub mod tracking;
pub mod types;
