//! Authorization gate for production actions.

use pushdeck_core::{Actor, Job, Result, TicketService};
use std::sync::Arc;

/// Decides whether an actor may promote, cancel or roll back a job.
///
/// Evaluated on every call. Nothing is cached on the job.
#[derive(Clone)]
pub struct AuthorizationGate {
    tickets: Arc<dyn TicketService>,
}

impl AuthorizationGate {
    pub fn new(tickets: Arc<dyn TicketService>) -> Self {
        Self { tickets }
    }

    /// True iff the actor has a permission set and the ticketing service
    /// says it covers the job's module. No permission set is a plain `false`.
    pub async fn can_be_pushed_live(&self, job: &Job, actor: &Actor) -> Result<bool> {
        let Some(permissions) = actor.permissions.as_ref() else {
            return Ok(false);
        };
        self.tickets
            .can_member_deploy(permissions, job.target_module())
            .await
    }
}
