//! Deployment ticketing service contract.
//!
//! Production deployments need a ticket from an external ticketing system.
//! The same system answers whether a member may deploy a given module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::identity::Permissions;
use crate::job::Job;

/// Reference issued by the ticketing system. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticket(String);

impl Ticket {
    /// `None` for a blank value, which the ticketing system uses for "no ticket".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticket {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Ticket::new(value).ok_or_else(|| "ticket must not be blank".to_string())
    }
}

impl From<Ticket> for String {
    fn from(ticket: Ticket) -> Self {
        ticket.0
    }
}

/// What a ticket request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketAction {
    Deploy,
    Rollback,
    Cancel,
}

impl std::fmt::Display for TicketAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketAction::Deploy => write!(f, "deploy"),
            TicketAction::Rollback => write!(f, "rollback"),
            TicketAction::Cancel => write!(f, "cancel"),
        }
    }
}

/// Trait for ticketing backends.
#[async_trait]
pub trait TicketService: Send + Sync {
    /// Ask for a ticket before a production deploy or rollback.
    ///
    /// `Ok(None)` means the request was refused. Transport or service errors
    /// are returned as errors, never as `None`.
    async fn pre_deploy(&self, job: &Job, action: TicketAction) -> Result<Option<Ticket>>;

    /// Report the outcome of a ticketed deployment (only cancellation today).
    async fn post_deploy(&self, job: &Job, action: TicketAction) -> Result<()>;

    /// Whether `permissions` allow deploying `module` to production.
    async fn can_member_deploy(&self, permissions: &Permissions, module: &str) -> Result<bool>;
}
