//! Idempotent event publishing and latest-snapshot resolution for
//! multi-step AI workflows.

pub mod config;
pub mod engine_paths;
pub mod event_store;
pub mod events;
pub mod handlers;
pub mod outcome;
pub mod snapshot;
pub mod structured_logger;
pub mod types;
pub mod workflow;
