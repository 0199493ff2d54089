//! The deployment job entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{Environment, JobStatus};
use crate::ticketing::Ticket;
use crate::transition::{self, Transition, Trigger};
use crate::{Error, JobId, Result};

/// A tracked request to deploy a module version.
///
/// Fields are private: the deploy target and requestor are fixed at
/// construction and the status only moves along [`transition::TRANSITIONS`].
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: Option<JobId>,
    revision: i64,
    target_module: String,
    target_version: String,
    target_environment: Environment,
    requestor: String,
    status: JobStatus,
    ticket: Option<Ticket>,
    user: Option<String>,
    rollbacked_from: Option<JobId>,
    test_job_url: Option<String>,
    deployment_job_id: Option<String>,
    live_job_id: Option<String>,
    queued_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Every field of a persisted job, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: JobId,
    #[serde(skip)]
    pub revision: i64,
    pub target_module: String,
    pub target_version: String,
    pub target_environment: Environment,
    pub requestor: String,
    pub status: JobStatus,
    pub ticket: Option<Ticket>,
    pub user: Option<String>,
    pub rollbacked_from: Option<JobId>,
    pub test_job_url: Option<String>,
    pub deployment_job_id: Option<String>,
    pub live_job_id: Option<String>,
    pub queued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// A fresh job, queued now.
    pub fn new(
        module: impl Into<String>,
        version: impl Into<String>,
        environment: Environment,
        requestor: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            revision: 0,
            target_module: module.into(),
            target_version: version.into(),
            target_environment: environment,
            requestor: requestor.into(),
            status: JobStatus::Queued,
            ticket: None,
            user: None,
            rollbacked_from: None,
            test_job_url: None,
            deployment_job_id: None,
            live_job_id: None,
            queued_at: now,
            updated_at: now,
        }
    }

    /// A new job that redeploys what `prior` deployed.
    ///
    /// It starts in `QUEUED_FOR_LIVE` and carries the prior ticket until the
    /// ticketing service issues one for the rollback.
    pub fn rollback_of(prior: &Job) -> Result<Self> {
        let prior_id = prior
            .id
            .ok_or_else(|| Error::InvalidInput("cannot roll back an unsaved job".to_string()))?;

        let mut job = Job::new(
            prior.target_module.clone(),
            prior.target_version.clone(),
            prior.target_environment,
            prior.requestor.clone(),
        );
        job.status = JobStatus::QueuedForLive;
        job.rollbacked_from = Some(prior_id);
        job.ticket = prior.ticket.clone();
        Ok(job)
    }

    /// Rebuild a job from its stored record, verbatim.
    pub fn restore(record: JobRecord) -> Self {
        Self {
            id: Some(record.id),
            revision: record.revision,
            target_module: record.target_module,
            target_version: record.target_version,
            target_environment: record.target_environment,
            requestor: record.requestor,
            status: record.status,
            ticket: record.ticket,
            user: record.user,
            rollbacked_from: record.rollbacked_from,
            test_job_url: record.test_job_url,
            deployment_job_id: record.deployment_job_id,
            live_job_id: record.live_job_id,
            queued_at: record.queued_at,
            updated_at: record.updated_at,
        }
    }

    /// The stored form of this job. `None` until it has been saved.
    pub fn record(&self) -> Option<JobRecord> {
        Some(JobRecord {
            id: self.id?,
            revision: self.revision,
            target_module: self.target_module.clone(),
            target_version: self.target_version.clone(),
            target_environment: self.target_environment,
            requestor: self.requestor.clone(),
            status: self.status,
            ticket: self.ticket.clone(),
            user: self.user.clone(),
            rollbacked_from: self.rollbacked_from,
            test_job_url: self.test_job_url.clone(),
            deployment_job_id: self.deployment_job_id.clone(),
            live_job_id: self.live_job_id.clone(),
            queued_at: self.queued_at,
            updated_at: self.updated_at,
        })
    }

    pub fn id(&self) -> Option<JobId> {
        self.id
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    pub fn target_module(&self) -> &str {
        &self.target_module
    }

    pub fn target_version(&self) -> &str {
        &self.target_version
    }

    pub fn target_environment(&self) -> Environment {
        self.target_environment
    }

    pub fn requestor(&self) -> &str {
        &self.requestor
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn rollbacked_from(&self) -> Option<JobId> {
        self.rollbacked_from
    }

    pub fn test_job_url(&self) -> Option<&str> {
        self.test_job_url.as_deref()
    }

    pub fn deployment_job_id(&self) -> Option<&str> {
        self.deployment_job_id.as_deref()
    }

    pub fn live_job_id(&self) -> Option<&str> {
        self.live_job_id.as_deref()
    }

    pub fn queued_at(&self) -> DateTime<Utc> {
        self.queued_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn can_go_live(&self) -> bool {
        self.status == JobStatus::TestsPassed
    }

    pub fn went_live(&self) -> bool {
        self.status == JobStatus::GoLiveDone
    }

    pub fn set_ticket(&mut self, ticket: Option<Ticket>) {
        self.ticket = ticket;
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }

    pub fn set_test_job_url(&mut self, url: impl Into<String>) {
        self.test_job_url = Some(url.into());
    }

    pub fn set_deployment_job_id(&mut self, id: impl Into<String>) {
        self.deployment_job_id = Some(id.into());
    }

    pub fn set_live_job_id(&mut self, id: impl Into<String>) {
        self.live_job_id = Some(id.into());
    }

    /// Move along a row of the transition table.
    ///
    /// Fails when the row does not start at the current status.
    pub fn apply(&mut self, transition: &Transition) -> Result<JobStatus> {
        if transition.from != self.status {
            return Err(Error::InvalidTransition {
                status: self.status,
                trigger: transition.trigger,
            });
        }
        self.status = transition.to;
        self.updated_at = Utc::now();
        Ok(self.status)
    }

    /// Look up the row for `trigger` from the current status and apply it.
    pub fn advance(&mut self, trigger: Trigger) -> Result<&'static Transition> {
        let transition = self.transition_for(trigger)?;
        self.apply(transition)?;
        Ok(transition)
    }

    /// The row for `trigger` from the current status.
    pub fn transition_for(&self, trigger: Trigger) -> Result<&'static Transition> {
        transition::lookup(self.status, trigger).ok_or(Error::InvalidTransition {
            status: self.status,
            trigger,
        })
    }

    /// Called by stores after a successful write.
    pub fn mark_persisted(&mut self, id: JobId, revision: i64) {
        self.id = Some(id);
        self.revision = revision;
    }
}
