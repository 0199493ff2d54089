//! Error types for Pushdeck.

use thiserror::Error;

use crate::status::JobStatus;
use crate::transition::Trigger;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} is not a valid module to push.")]
    UnknownModule(String),

    #[error("unable to {trigger} a job on status: {status}")]
    InvalidTransition { status: JobStatus, trigger: Trigger },

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("upstream failure: {0}")]
    Upstream(String),
}

pub type Result<T> = std::result::Result<T, Error>;
