//! Deployment ticketing client.
//!
//! Wire contract:
//! - `POST {base}/tickets` with a [`TicketRequest`], answered by
//!   `{"ticket": "CHG-1"}` or `{"ticket": null}` when refused.
//! - `POST {base}/tickets/report` with a [`TicketRequest`] for cancellations.
//! - `POST {base}/members/can-deploy` with `{"permissions": [...], "module": "web"}`,
//!   answered by `{"allowed": true}`.

use async_trait::async_trait;
use pushdeck_config::EndpointConfig;
use pushdeck_core::{
    Environment, Job, JobId, Permissions, Result, Ticket, TicketAction, TicketService,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Endpoint, ServiceError, check};

#[derive(Debug, Serialize)]
pub struct TicketRequest<'a> {
    pub action: TicketAction,
    pub job_id: Option<JobId>,
    pub module: &'a str,
    pub version: &'a str,
    pub environment: Environment,
    pub requestor: &'a str,
    pub user: Option<&'a str>,
    pub ticket: Option<&'a str>,
    pub rollbacked_from: Option<JobId>,
}

impl<'a> TicketRequest<'a> {
    pub fn new(job: &'a Job, action: TicketAction) -> Self {
        Self {
            action,
            job_id: job.id(),
            module: job.target_module(),
            version: job.target_version(),
            environment: job.target_environment(),
            requestor: job.requestor(),
            user: job.user(),
            ticket: job.ticket().map(Ticket::as_str),
            rollbacked_from: job.rollbacked_from(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TicketResponse {
    ticket: Option<String>,
}

#[derive(Debug, Serialize)]
struct CapabilityRequest<'a> {
    permissions: &'a Permissions,
    module: &'a str,
}

#[derive(Debug, Deserialize)]
struct CapabilityResponse {
    allowed: bool,
}

pub struct HttpTicketService {
    endpoint: Endpoint,
}

impl HttpTicketService {
    pub fn new(config: &EndpointConfig) -> std::result::Result<Self, ServiceError> {
        Ok(Self {
            endpoint: Endpoint::new(config)?,
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<reqwest::Response, ServiceError> {
        let response = self
            .endpoint
            .client()
            .post(self.endpoint.url(path)?)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        check(response).await
    }
}

#[async_trait]
impl TicketService for HttpTicketService {
    async fn pre_deploy(&self, job: &Job, action: TicketAction) -> Result<Option<Ticket>> {
        let response: TicketResponse = self
            .post("tickets", &TicketRequest::new(job, action))
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        let ticket = response.ticket.and_then(Ticket::new);
        if ticket.is_none() {
            warn!(module = %job.target_module(), action = %action, "ticket refused");
        }
        Ok(ticket)
    }

    async fn post_deploy(&self, job: &Job, action: TicketAction) -> Result<()> {
        self.post("tickets/report", &TicketRequest::new(job, action))
            .await?;
        debug!(job_id = ?job.id(), action = %action, "ticket outcome reported");
        Ok(())
    }

    async fn can_member_deploy(&self, permissions: &Permissions, module: &str) -> Result<bool> {
        let response: CapabilityResponse = self
            .post(
                "members/can-deploy",
                &CapabilityRequest {
                    permissions,
                    module,
                },
            )
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;
        Ok(response.allowed)
    }
}
