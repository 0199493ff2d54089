//! Job repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pushdeck_core::{Job, JobId, JobRecord, JobStatus, Ticket};
use sqlx::PgPool;
use tracing::debug;

use crate::{DbError, DbResult};

/// Filter for [`JobRepo::find_by_status`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusQuery {
    pub statuses: Vec<JobStatus>,
    /// Only these modules. Empty means every module.
    pub modules: Vec<String>,
    pub limit: Option<i64>,
}

impl StatusQuery {
    pub fn new(statuses: &[JobStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            ..Self::default()
        }
    }

    pub fn with_modules(mut self, modules: Vec<String>) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `job` passes the status and module filters (not the limit).
    pub fn matches(&self, job: &Job) -> bool {
        self.statuses.contains(&job.status())
            && (self.modules.is_empty() || self.modules.iter().any(|m| m == job.target_module()))
    }
}

#[async_trait]
pub trait JobRepo: Send + Sync {
    async fn get(&self, id: JobId) -> DbResult<Job>;

    /// Insert a new job or update an existing one.
    ///
    /// Updates only succeed when the stored revision still equals the
    /// revision the job was loaded with. On success the job carries its id
    /// and new revision.
    async fn save(&self, job: &mut Job) -> DbResult<JobId>;

    /// Jobs matching `query`, newest first.
    async fn find_by_status(&self, query: &StatusQuery) -> DbResult<Vec<Job>>;
}

/// A row of the `jobs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobRow {
    pub id: i64,
    pub revision: i64,
    pub target_module: String,
    pub target_version: String,
    pub target_environment: String,
    pub requestor: String,
    pub status: String,
    pub ticket: Option<String>,
    pub user_name: Option<String>,
    pub rollbacked_from: Option<i64>,
    pub test_job_url: Option<String>,
    pub deployment_job_id: Option<String>,
    pub live_job_id: Option<String>,
    pub queued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = DbError;

    fn try_from(row: JobRow) -> DbResult<Self> {
        let status = row
            .status
            .parse()
            .map_err(|e| DbError::Corrupt(format!("job {}: {}", row.id, e)))?;
        let target_environment = row
            .target_environment
            .parse()
            .map_err(|e| DbError::Corrupt(format!("job {}: {}", row.id, e)))?;

        Ok(Job::restore(JobRecord {
            id: JobId::new(row.id),
            revision: row.revision,
            target_module: row.target_module,
            target_version: row.target_version,
            target_environment,
            requestor: row.requestor,
            status,
            ticket: row.ticket.and_then(Ticket::new),
            user: row.user_name,
            rollbacked_from: row.rollbacked_from.map(JobId::new),
            test_job_url: row.test_job_url,
            deployment_job_id: row.deployment_job_id,
            live_job_id: row.live_job_id,
            queued_at: row.queued_at,
            updated_at: row.updated_at,
        }))
    }
}

/// PostgreSQL implementation of JobRepo.
pub struct PgJobRepo {
    pool: PgPool,
}

impl PgJobRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, job: &mut Job) -> DbResult<JobId> {
        let (id, revision): (i64, i64) = sqlx::query_as(
            r#"
            INSERT INTO jobs (
                revision, target_module, target_version, target_environment, requestor,
                status, ticket, user_name, rollbacked_from, test_job_url,
                deployment_job_id, live_job_id, queued_at, updated_at
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, revision
            "#,
        )
        .bind(job.target_module())
        .bind(job.target_version())
        .bind(job.target_environment().as_str())
        .bind(job.requestor())
        .bind(job.status().as_str())
        .bind(job.ticket().map(Ticket::as_str))
        .bind(job.user())
        .bind(job.rollbacked_from().map(|id| id.get()))
        .bind(job.test_job_url())
        .bind(job.deployment_job_id())
        .bind(job.live_job_id())
        .bind(job.queued_at())
        .bind(job.updated_at())
        .fetch_one(&self.pool)
        .await?;

        let id = JobId::new(id);
        job.mark_persisted(id, revision);
        Ok(id)
    }

    async fn update(&self, id: JobId, job: &mut Job) -> DbResult<JobId> {
        // Target, requestor and rollback origin are immutable and never rewritten.
        let updated: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE jobs
            SET status = $3, ticket = $4, user_name = $5, test_job_url = $6,
                deployment_job_id = $7, live_job_id = $8, updated_at = $9,
                revision = revision + 1
            WHERE id = $1 AND revision = $2
            RETURNING revision
            "#,
        )
        .bind(id.get())
        .bind(job.revision())
        .bind(job.status().as_str())
        .bind(job.ticket().map(Ticket::as_str))
        .bind(job.user())
        .bind(job.test_job_url())
        .bind(job.deployment_job_id())
        .bind(job.live_job_id())
        .bind(job.updated_at())
        .fetch_optional(&self.pool)
        .await?;

        if let Some((revision,)) = updated {
            job.mark_persisted(id, revision);
            return Ok(id);
        }

        let exists: Option<(i64,)> = sqlx::query_as("SELECT revision FROM jobs WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some((current,)) => {
                debug!(job_id = %id, loaded = job.revision(), current, "stale job revision");
                Err(DbError::Conflict(format!(
                    "job {} was modified concurrently",
                    id
                )))
            }
            None => Err(DbError::NotFound(format!("job {}", id))),
        }
    }
}

#[async_trait]
impl JobRepo for PgJobRepo {
    async fn get(&self, id: JobId) -> DbResult<Job> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("job {}", id)))?;
        Job::try_from(row)
    }

    async fn save(&self, job: &mut Job) -> DbResult<JobId> {
        match job.id() {
            None => self.insert(job).await,
            Some(id) => self.update(id, job).await,
        }
    }

    async fn find_by_status(&self, query: &StatusQuery) -> DbResult<Vec<Job>> {
        let statuses: Vec<String> = query
            .statuses
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM jobs
            WHERE status = ANY($1)
              AND (cardinality($2::text[]) = 0 OR target_module = ANY($2))
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(&statuses)
        .bind(&query.modules)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Job::try_from).collect()
    }
}
