//! Job lifecycle operations and the dashboard read model.
//!
//! [`JobService`] applies operator and build-runner actions to jobs through
//! the transition table. [`JobBoard`] classifies jobs into dashboard buckets
//! and enriches them with display fields.

pub mod board;
pub mod gate;
pub mod service;

#[cfg(test)]
mod fixtures;

pub use board::{BoardFilter, BoardSnapshot, Bucket, DeployingSummary, JobBoard, JobView};
pub use gate::AuthorizationGate;
pub use service::{Decision, JobService, NewJob, TestOutcome};
