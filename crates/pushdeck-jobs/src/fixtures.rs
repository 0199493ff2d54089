//! Test doubles shared by the service and board tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pushdeck_core::{
    Actor, BuildRunner, Environment, Error, Identity, Job, JobId, JobRecord, JobStatus,
    Permissions, Result, Ticket, TicketAction, TicketService,
};
use std::collections::HashSet;
use std::sync::Mutex;

pub struct FakeTickets {
    allowed: HashSet<String>,
    issue: Option<String>,
    fail_pre_deploy: bool,
    fail_post_deploy: bool,
    fail_capability: bool,
    capability_checks: Mutex<usize>,
    pre_deploys: Mutex<Vec<(TicketAction, Option<String>)>>,
    post_deploys: Mutex<Vec<(TicketAction, Option<JobId>)>>,
}

impl FakeTickets {
    /// Grants `modules` to any permission set and issues ticket `CHG-100`.
    pub fn allowing(modules: &[&str]) -> Self {
        Self {
            allowed: modules.iter().map(|m| m.to_string()).collect(),
            issue: Some("CHG-100".to_string()),
            fail_pre_deploy: false,
            fail_post_deploy: false,
            fail_capability: false,
            capability_checks: Mutex::new(0),
            pre_deploys: Mutex::new(Vec::new()),
            post_deploys: Mutex::new(Vec::new()),
        }
    }

    pub fn issuing(mut self, ticket: Option<&str>) -> Self {
        self.issue = ticket.map(String::from);
        self
    }

    pub fn failing_pre_deploy(mut self) -> Self {
        self.fail_pre_deploy = true;
        self
    }

    pub fn failing_post_deploy(mut self) -> Self {
        self.fail_post_deploy = true;
        self
    }

    pub fn failing_capability(mut self) -> Self {
        self.fail_capability = true;
        self
    }

    pub fn capability_checks(&self) -> usize {
        *self.capability_checks.lock().unwrap()
    }

    /// Action and the ticket the job carried at request time.
    pub fn pre_deploys(&self) -> Vec<(TicketAction, Option<String>)> {
        self.pre_deploys.lock().unwrap().clone()
    }

    pub fn post_deploys(&self) -> Vec<(TicketAction, Option<JobId>)> {
        self.post_deploys.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketService for FakeTickets {
    async fn pre_deploy(&self, job: &Job, action: TicketAction) -> Result<Option<Ticket>> {
        self.pre_deploys
            .lock()
            .unwrap()
            .push((action, job.ticket().map(|t| t.to_string())));
        if self.fail_pre_deploy {
            return Err(Error::Upstream("ticketing unavailable".to_string()));
        }
        Ok(self.issue.clone().and_then(Ticket::new))
    }

    async fn post_deploy(&self, job: &Job, action: TicketAction) -> Result<()> {
        self.post_deploys.lock().unwrap().push((action, job.id()));
        if self.fail_post_deploy {
            return Err(Error::Upstream("ticketing unavailable".to_string()));
        }
        Ok(())
    }

    async fn can_member_deploy(&self, _permissions: &Permissions, module: &str) -> Result<bool> {
        *self.capability_checks.lock().unwrap() += 1;
        if self.fail_capability {
            return Err(Error::Upstream("ticketing unavailable".to_string()));
        }
        Ok(self.allowed.contains(module))
    }
}

pub struct FakeRunner;

impl BuildRunner for FakeRunner {
    fn console_url(&self, job: &Job) -> Result<String> {
        Ok(format!("http://ci.test/job/{}/console", job.requestor()))
    }
}

pub fn authorized() -> Actor {
    Actor::new(
        Identity {
            username: "ops".to_string(),
            email: Some("ops@example.com".to_string()),
        },
        Some(Permissions(vec!["release-managers".to_string()])),
    )
}

/// Logged in, but without a permission set.
pub fn unprivileged() -> Actor {
    Actor::new(
        Identity {
            username: "dev".to_string(),
            email: None,
        },
        None,
    )
}

pub fn record(id: i64, module: &str, status: JobStatus) -> JobRecord {
    let queued_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    JobRecord {
        id: JobId::new(id),
        revision: 1,
        target_module: module.to_string(),
        target_version: "1.2.3".to_string(),
        target_environment: Environment::Staging,
        requestor: "ci-1".to_string(),
        status,
        ticket: None,
        user: None,
        rollbacked_from: None,
        test_job_url: None,
        deployment_job_id: None,
        live_job_id: None,
        queued_at,
        updated_at: queued_at,
    }
}
