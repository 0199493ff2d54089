//! Dashboard read side: status buckets and enriched job views.

use chrono::{DateTime, Utc};
use pushdeck_config::VersionLink;
use pushdeck_core::{
    Actor, BuildRunner, Environment, Job, JobRecord, JobStatus, Result, TicketService,
};
use pushdeck_db::{JobRepo, StatusQuery};
use serde::Serialize;
use std::sync::Arc;

use crate::gate::AuthorizationGate;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// One column of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Queued,
    InProgress,
    Deployed,
}

impl Bucket {
    pub fn statuses(self, environment: Environment) -> &'static [JobStatus] {
        use JobStatus::*;
        match (self, environment) {
            (Bucket::Queued, Environment::Staging) => &[Queued],
            (Bucket::Queued, Environment::Production) => &[QueuedForLive],
            (Bucket::InProgress, Environment::Staging) => &[Deploying, PendingTests],
            (Bucket::InProgress, Environment::Production) => &[GoingLive],
            (Bucket::Deployed, Environment::Staging) => &[TestsPassed, TestsFailed, DeployFailed],
            (Bucket::Deployed, Environment::Production) => &[GoLiveDone, GoLiveFailed],
        }
    }
}

/// Filters for the deployed buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
    pub module: Option<String>,
    pub page_size: Option<i64>,
}

/// A job as displayed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub job: JobRecord,
    #[serde(rename = "_buildJobUrl")]
    pub build_job_url: String,
    #[serde(rename = "_deployJobUrl")]
    pub deploy_job_url: Option<String>,
    #[serde(rename = "_deployLiveJobUrl")]
    pub deploy_live_job_url: Option<String>,
    #[serde(rename = "_canGoLive")]
    pub can_go_live: bool,
    #[serde(rename = "_canRollback")]
    pub can_rollback: bool,
    #[serde(rename = "_canCancel")]
    pub can_cancel: bool,
    #[serde(rename = "_serverTime")]
    pub server_time: String,
    #[serde(rename = "_queued_at")]
    pub queued_at: String,
    #[serde(rename = "_updated_at")]
    pub updated_at: String,
    #[serde(rename = "_versionLink")]
    pub version_link: String,
}

/// All six buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub preprod_queue: Vec<JobView>,
    pub preprod_inprogress: Vec<JobView>,
    pub preprod_deployed: Vec<JobView>,
    pub prod_queue: Vec<JobView>,
    pub prod_inprogress: Vec<JobView>,
    pub prod_deployed: Vec<JobView>,
}

/// What production is doing right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployingSummary {
    pub status: String,
    pub module: String,
    pub version: String,
}

impl DeployingSummary {
    fn idle() -> Self {
        Self {
            status: "Idle".to_string(),
            module: "-".to_string(),
            version: "-".to_string(),
        }
    }

    fn deploying(job: &Job) -> Self {
        Self {
            status: "Deploying".to_string(),
            module: job.target_module().to_string(),
            version: job.target_version().to_string(),
        }
    }
}

/// Classifies jobs into dashboard buckets and decorates them for display.
pub struct JobBoard {
    repo: Arc<dyn JobRepo>,
    gate: AuthorizationGate,
    runner: Arc<dyn BuildRunner>,
    link: VersionLink,
    default_page_size: Option<i64>,
}

impl JobBoard {
    pub fn new(
        repo: Arc<dyn JobRepo>,
        tickets: Arc<dyn TicketService>,
        runner: Arc<dyn BuildRunner>,
        link: VersionLink,
        default_page_size: Option<i64>,
    ) -> Self {
        Self {
            repo,
            gate: AuthorizationGate::new(tickets),
            runner,
            link,
            default_page_size,
        }
    }

    pub async fn queued(&self, environment: Environment, actor: &Actor) -> Result<Vec<JobView>> {
        let query = StatusQuery::new(Bucket::Queued.statuses(environment));
        self.list(&query, actor).await
    }

    pub async fn inprogress(
        &self,
        environment: Environment,
        actor: &Actor,
    ) -> Result<Vec<JobView>> {
        let query = StatusQuery::new(Bucket::InProgress.statuses(environment));
        self.list(&query, actor).await
    }

    /// Finished jobs, optionally narrowed to one module and paged.
    pub async fn deployed(
        &self,
        environment: Environment,
        filter: &BoardFilter,
        actor: &Actor,
    ) -> Result<Vec<JobView>> {
        let modules = filter.module.iter().cloned().collect();
        let query = StatusQuery::new(Bucket::Deployed.statuses(environment))
            .with_modules(modules)
            .with_limit(filter.page_size.or(self.default_page_size));
        self.list(&query, actor).await
    }

    pub async fn all(&self, filter: &BoardFilter, actor: &Actor) -> Result<BoardSnapshot> {
        let (
            preprod_queue,
            preprod_inprogress,
            preprod_deployed,
            prod_queue,
            prod_inprogress,
            prod_deployed,
        ) = tokio::try_join!(
            self.queued(Environment::Staging, actor),
            self.inprogress(Environment::Staging, actor),
            self.deployed(Environment::Staging, filter, actor),
            self.queued(Environment::Production, actor),
            self.inprogress(Environment::Production, actor),
            self.deployed(Environment::Production, filter, actor),
        )?;

        Ok(BoardSnapshot {
            preprod_queue,
            preprod_inprogress,
            preprod_deployed,
            prod_queue,
            prod_inprogress,
            prod_deployed,
        })
    }

    /// The oldest job currently going live, if any.
    pub async fn deploying(&self) -> Result<DeployingSummary> {
        let jobs = self
            .repo
            .find_by_status(&StatusQuery::new(&[JobStatus::GoingLive]))
            .await?;
        Ok(jobs
            .iter()
            .min_by_key(|job| (job.queued_at(), job.id()))
            .map(DeployingSummary::deploying)
            .unwrap_or_else(DeployingSummary::idle))
    }

    async fn list(&self, query: &StatusQuery, actor: &Actor) -> Result<Vec<JobView>> {
        let jobs = self.repo.find_by_status(query).await?;
        let mut views = Vec::with_capacity(jobs.len());
        for job in &jobs {
            if let Some(view) = self.enrich(job, actor).await? {
                views.push(view);
            }
        }
        Ok(views)
    }

    /// Display form of a saved job. `None` for a job that was never saved.
    pub async fn enrich(&self, job: &Job, actor: &Actor) -> Result<Option<JobView>> {
        let Some(record) = job.record() else {
            return Ok(None);
        };
        let allowed = self.gate.can_be_pushed_live(job, actor).await?;

        Ok(Some(JobView {
            build_job_url: self.runner.console_url(job)?,
            deploy_job_url: record.deployment_job_id.clone(),
            deploy_live_job_url: record.live_job_id.clone(),
            can_go_live: job.can_go_live() && allowed,
            can_rollback: job.went_live() && allowed,
            can_cancel: allowed,
            server_time: format_timestamp(Utc::now()),
            queued_at: format_timestamp(record.queued_at),
            updated_at: format_timestamp(record.updated_at),
            version_link: self
                .link
                .link_for(&record.target_module, &record.target_version),
            job: record,
        }))
    }
}
