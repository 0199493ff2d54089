//! Core domain types and traits for the Pushdeck deployment dashboard.
//!
//! This crate contains:
//! - Job identifiers, statuses and environments
//! - The job entity and its transition table
//! - Collaborator traits (ticketing, identity, build runner)

pub mod error;
pub mod id;
pub mod identity;
pub mod job;
pub mod runner;
pub mod status;
pub mod ticketing;
pub mod transition;

pub use error::{Error, Result};
pub use id::JobId;
pub use identity::{Actor, Identity, IdentityProvider, Permissions, resolve_actor};
pub use job::{Job, JobRecord};
pub use runner::BuildRunner;
pub use status::{Environment, JobStatus};
pub use ticketing::{Ticket, TicketAction, TicketService};
pub use transition::{Effect, Transition, Trigger};
