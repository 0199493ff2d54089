//! In-memory job repository.
//!
//! Used when no database is configured, and as the store behind service tests.

use async_trait::async_trait;
use pushdeck_core::{Job, JobId, JobRecord};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use crate::repo::job::{JobRepo, StatusQuery};
use crate::{DbError, DbResult};

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    jobs: BTreeMap<JobId, Job>,
}

/// Job repository held in process memory.
#[derive(Debug, Default)]
pub struct MemoryJobRepo {
    state: Mutex<State>,
}

impl MemoryJobRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a job record as-is, keeping its id and revision.
    pub async fn restore(&self, record: JobRecord) -> JobId {
        let mut state = self.state.lock().await;
        let id = record.id;
        state.last_id = state.last_id.max(id.get());
        state.jobs.insert(id, Job::restore(record));
        id
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.jobs.is_empty()
    }
}

#[async_trait]
impl JobRepo for MemoryJobRepo {
    async fn get(&self, id: JobId) -> DbResult<Job> {
        let state = self.state.lock().await;
        state
            .jobs
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("job {}", id)))
    }

    async fn save(&self, job: &mut Job) -> DbResult<JobId> {
        let mut state = self.state.lock().await;

        let (id, revision) = match job.id() {
            None => {
                state.last_id += 1;
                (JobId::new(state.last_id), 1)
            }
            Some(id) => {
                let stored = state
                    .jobs
                    .get(&id)
                    .ok_or_else(|| DbError::NotFound(format!("job {}", id)))?;
                if stored.revision() != job.revision() {
                    return Err(DbError::Conflict(format!(
                        "job {} was modified concurrently",
                        id
                    )));
                }
                (id, stored.revision() + 1)
            }
        };

        job.mark_persisted(id, revision);
        state.jobs.insert(id, job.clone());
        Ok(id)
    }

    async fn find_by_status(&self, query: &StatusQuery) -> DbResult<Vec<Job>> {
        let state = self.state.lock().await;
        let limit = query
            .limit
            .map(|l| usize::try_from(l).unwrap_or(0))
            .unwrap_or(usize::MAX);

        Ok(state
            .jobs
            .values()
            .rev()
            .filter(|job| query.matches(job))
            .take(limit)
            .cloned()
            .collect())
    }
}
