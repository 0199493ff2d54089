//! Application state.

use pushdeck_config::SystemConfig;
use pushdeck_core::{Actor, BuildRunner, IdentityProvider, Result, TicketService, resolve_actor};
use pushdeck_db::JobRepo;
use pushdeck_jobs::{JobBoard, JobService};
use std::sync::Arc;

use crate::services::{HttpIdentityProvider, HttpTicketService, ServiceError, UrlBuildRunner};
use crate::session::SessionToken;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn JobRepo>,
    pub jobs: Arc<JobService>,
    pub board: Arc<JobBoard>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Collaborators the state is assembled from.
pub struct Collaborators {
    pub repo: Arc<dyn JobRepo>,
    pub tickets: Arc<dyn TicketService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub runner: Arc<dyn BuildRunner>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("{0} endpoint is not configured")]
    MissingEndpoint(&'static str),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl AppState {
    /// Build the state with HTTP clients for every collaborator in `config`.
    pub fn new(config: &SystemConfig, repo: Arc<dyn JobRepo>) -> std::result::Result<Self, StateError> {
        let ticketing = config
            .ticketing
            .as_ref()
            .ok_or(StateError::MissingEndpoint("ticketing"))?;
        let identity = config
            .identity
            .as_ref()
            .ok_or(StateError::MissingEndpoint("identity"))?;
        let build_runner = config
            .build_runner
            .as_ref()
            .ok_or(StateError::MissingEndpoint("build-runner"))?;

        let collaborators = Collaborators {
            repo,
            tickets: Arc::new(HttpTicketService::new(ticketing)?),
            identity: Arc::new(HttpIdentityProvider::new(identity)?),
            runner: Arc::new(UrlBuildRunner::from_config(build_runner)),
        };
        Ok(Self::from_parts(config, collaborators))
    }

    pub fn from_parts(config: &SystemConfig, parts: Collaborators) -> Self {
        let jobs = JobService::new(
            parts.repo.clone(),
            parts.tickets.clone(),
            config.modules.clone(),
        );
        let board = JobBoard::new(
            parts.repo.clone(),
            parts.tickets,
            parts.runner,
            config.version_link.clone(),
            config.jobs.queue_length,
        );

        Self {
            repo: parts.repo,
            jobs: Arc::new(jobs),
            board: Arc::new(board),
            identity: parts.identity,
        }
    }

    /// Resolve the caller behind a session token.
    pub async fn actor(&self, token: &SessionToken) -> Result<Actor> {
        resolve_actor(self.identity.as_ref(), token.as_deref()).await
    }
}
