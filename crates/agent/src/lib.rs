//! Worktrace desktop agent.
//!
//! Starts a timer on the server, captures screenshots on a fixed period
//! while the timer is open, and stops both on shutdown.

pub mod capture;
pub mod client;
pub mod config;
pub mod orchestrator;
pub mod scheduler;
pub mod uploader;
