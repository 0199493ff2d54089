//! Job lifecycle operations.

use pushdeck_config::ModuleRegistry;
use pushdeck_core::{
    Actor, Effect, Environment, Error, Job, JobId, JobStatus, Result, TicketAction,
    TicketService, Trigger,
};
use pushdeck_db::JobRepo;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::gate::AuthorizationGate;

pub const GO_LIVE_REFUSED: &str = "The job is not in a valid status to go live or you don't have permissions to do this action";
pub const ROLLBACK_REFUSED: &str = "The job is not in a valid status to rollback or you don't have permissions to do this action";

/// Result of an operation that may be refused without anything failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<T> {
    Applied(T),
    /// Wrong status or missing permission. The job was left untouched.
    Refused {
        status: JobStatus,
        reason: &'static str,
    },
}

/// A build request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub module: String,
    pub version: String,
    pub requestor: String,
}

/// Outcome reported by the test run callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed,
}

impl TestOutcome {
    /// Wire form used by the build runner: only the literal `"true"` passes.
    pub fn from_flag(flag: &str) -> Self {
        if flag == "true" {
            TestOutcome::Passed
        } else {
            TestOutcome::Failed
        }
    }

    fn trigger(self) -> Trigger {
        match self {
            TestOutcome::Passed => Trigger::TestsPassed,
            TestOutcome::Failed => Trigger::TestsFailed,
        }
    }
}

/// Applies lifecycle operations to jobs.
pub struct JobService {
    repo: Arc<dyn JobRepo>,
    tickets: Arc<dyn TicketService>,
    gate: AuthorizationGate,
    modules: ModuleRegistry,
}

impl JobService {
    pub fn new(
        repo: Arc<dyn JobRepo>,
        tickets: Arc<dyn TicketService>,
        modules: ModuleRegistry,
    ) -> Self {
        let gate = AuthorizationGate::new(tickets.clone());
        Self {
            repo,
            tickets,
            gate,
            modules,
        }
    }

    /// Queue a staging build of a registered module.
    pub async fn create(&self, request: NewJob) -> Result<JobId> {
        if !self.modules.is_valid_module(&request.module) {
            return Err(Error::UnknownModule(request.module));
        }

        let mut job = Job::new(
            request.module,
            request.version,
            Environment::Staging,
            request.requestor,
        );
        let id = self.repo.save(&mut job).await?;
        info!(
            job_id = %id,
            module = %job.target_module(),
            version = %job.target_version(),
            "job inserted in queue"
        );
        Ok(id)
    }

    pub async fn status(&self, id: JobId) -> Result<JobStatus> {
        Ok(self.repo.get(id).await?.status())
    }

    /// Cancel a queued job. Cancelling a production job releases its ticket.
    ///
    /// The ticket is released before the save. A save that loses the
    /// revision race leaves the job queued with its ticket already cancelled,
    /// which is logged for manual reconciliation.
    pub async fn cancel(&self, id: JobId, actor: &Actor) -> Result<JobStatus> {
        let mut job = self.repo.get(id).await?;
        let transition = job.transition_for(Trigger::Cancel)?;

        if transition.gated && !self.gate.can_be_pushed_live(&job, actor).await? {
            return Err(Error::NotAuthorized(format!(
                "No permissions to cancel: {}",
                id
            )));
        }
        if transition.effect == Effect::CancelTicket {
            self.tickets.post_deploy(&job, TicketAction::Cancel).await?;
        }

        let status = job.apply(transition)?;
        if let Err(e) = self.repo.save(&mut job).await {
            if transition.effect == Effect::CancelTicket {
                warn!(
                    job_id = %id,
                    action = "cancel",
                    error = %e,
                    "ticket cancelled but job not saved"
                );
            }
            return Err(e.into());
        }
        info!(job_id = %id, status = %status, "job cancelled");
        Ok(status)
    }

    /// Promote a tested job to the production queue.
    ///
    /// Moves to `QUEUED_FOR_LIVE` when the ticketing service issues a ticket,
    /// to `GO_LIVE_FAILED` when it refuses.
    pub async fn go_live(&self, id: JobId, actor: &Actor) -> Result<Decision<JobStatus>> {
        let mut job = self.repo.get(id).await?;

        if !job.can_go_live() || !self.gate.can_be_pushed_live(&job, actor).await? {
            return Ok(Decision::Refused {
                status: job.status(),
                reason: GO_LIVE_REFUSED,
            });
        }

        if let Some(name) = actor.display_name() {
            job.set_user(name);
        }

        let status = match self.tickets.pre_deploy(&job, TicketAction::Deploy).await? {
            Some(ticket) => {
                let transition = job.transition_for(Trigger::GoLive)?;
                job.set_ticket(Some(ticket));
                job.apply(transition)?
            }
            None => {
                job.set_ticket(None);
                job.advance(Trigger::TicketDenied)?.to
            }
        };

        self.repo.save(&mut job).await?;
        info!(job_id = %id, status = %status, user = ?job.user(), "go live requested");
        Ok(Decision::Applied(status))
    }

    /// Queue a new production job that redeploys what `id` deployed.
    ///
    /// The prior job is never modified.
    pub async fn rollback(&self, id: JobId, actor: &Actor) -> Result<Decision<JobId>> {
        let prior = self.repo.get(id).await?;

        if !prior.went_live() || !self.gate.can_be_pushed_live(&prior, actor).await? {
            return Ok(Decision::Refused {
                status: prior.status(),
                reason: ROLLBACK_REFUSED,
            });
        }

        let mut job = Job::rollback_of(&prior)?;
        let ticket = self.tickets.pre_deploy(&job, TicketAction::Rollback).await?;
        job.set_ticket(ticket);
        if let Some(name) = actor.display_name() {
            job.set_user(name);
        }

        let new_id = self.repo.save(&mut job).await?;
        info!(job_id = %new_id, rollbacked_from = %id, "rollback job inserted in queue");
        Ok(Decision::Applied(new_id))
    }

    pub async fn register_test_job_url(&self, id: JobId, url: &str) -> Result<()> {
        let mut job = self.repo.get(id).await?;
        job.set_test_job_url(url);
        self.repo.save(&mut job).await?;
        info!(job_id = %id, url = %url, "test job url registered");
        Ok(())
    }

    pub async fn register_test_result(&self, id: JobId, outcome: TestOutcome) -> Result<JobStatus> {
        self.progress(id, outcome.trigger(), None).await
    }

    /// The build runner started the staging deploy.
    pub async fn deploy_started(&self, id: JobId, deployment_job_id: &str) -> Result<JobStatus> {
        self.progress(id, Trigger::DeployStarted, Some(deployment_job_id))
            .await
    }

    pub async fn deploy_finished(&self, id: JobId, success: bool) -> Result<JobStatus> {
        let trigger = if success {
            Trigger::DeploySucceeded
        } else {
            Trigger::DeployFailed
        };
        self.progress(id, trigger, None).await
    }

    /// The build runner started the production deploy.
    pub async fn live_started(&self, id: JobId, live_job_id: &str) -> Result<JobStatus> {
        self.progress(id, Trigger::LiveStarted, Some(live_job_id))
            .await
    }

    pub async fn live_finished(&self, id: JobId, success: bool) -> Result<JobStatus> {
        let trigger = if success {
            Trigger::LiveSucceeded
        } else {
            Trigger::LiveFailed
        };
        self.progress(id, trigger, None).await
    }

    /// Apply an ungated build-runner transition.
    async fn progress(
        &self,
        id: JobId,
        trigger: Trigger,
        external_job: Option<&str>,
    ) -> Result<JobStatus> {
        let mut job = self.repo.get(id).await?;
        let transition = job.transition_for(trigger)?;

        match (transition.effect, external_job) {
            (Effect::RecordDeploymentJob, Some(external)) => job.set_deployment_job_id(external),
            (Effect::RecordLiveJob, Some(external)) => job.set_live_job_id(external),
            _ => {}
        }

        let status = job.apply(transition)?;
        self.repo.save(&mut job).await?;
        info!(job_id = %id, status = %status, "job progress registered");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FakeTickets, authorized, record, unprivileged};
    use pushdeck_core::Ticket;
    use pushdeck_db::MemoryJobRepo;

    struct Harness {
        repo: Arc<MemoryJobRepo>,
        tickets: Arc<FakeTickets>,
        service: JobService,
    }

    fn harness(tickets: FakeTickets) -> Harness {
        let repo = Arc::new(MemoryJobRepo::new());
        let tickets = Arc::new(tickets);
        let service = JobService::new(
            repo.clone(),
            tickets.clone(),
            ModuleRegistry::new(["web", "api"]),
        );
        Harness {
            repo,
            tickets,
            service,
        }
    }

    fn new_job(module: &str) -> NewJob {
        NewJob {
            module: module.to_string(),
            version: "1.2.3".to_string(),
            requestor: "ci-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_queues_staging_job() {
        let h = harness(FakeTickets::allowing(&["web"]));

        let id = h.service.create(new_job("web")).await.unwrap();

        let job = h.repo.get(id).await.unwrap();
        assert_eq!(job.status(), JobStatus::Queued);
        assert_eq!(job.target_environment(), Environment::Staging);
        assert_eq!(job.requestor(), "ci-1");
        assert_eq!(h.service.status(id).await.unwrap(), JobStatus::Queued);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_module() {
        let h = harness(FakeTickets::allowing(&["web"]));

        let err = h.service.create(new_job("unknown-mod")).await.unwrap_err();

        assert!(matches!(err, Error::UnknownModule(_)));
        assert!(err.to_string().contains("is not a valid module to push."));
        assert!(h.repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_status_of_missing_job() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let result = h.service.status(JobId::new(404)).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cancel_queued_job_needs_no_permission() {
        let h = harness(FakeTickets::allowing(&[]));
        let id = h.repo.restore(record(1, "web", JobStatus::Queued)).await;

        let status = h.service.cancel(id, &Actor::anonymous()).await.unwrap();

        assert_eq!(status, JobStatus::DeployFailed);
        assert!(h.tickets.post_deploys().is_empty());
        assert_eq!(h.tickets.capability_checks(), 0);
    }

    #[tokio::test]
    async fn test_cancel_twice_is_invalid_transition() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h.repo.restore(record(1, "web", JobStatus::Queued)).await;

        h.service.cancel(id, &authorized()).await.unwrap();
        let err = h.service.cancel(id, &authorized()).await.unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidTransition {
                status: JobStatus::DeployFailed,
                trigger: Trigger::Cancel
            }
        ));
    }

    #[tokio::test]
    async fn test_cancel_queued_for_live_releases_ticket() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h
            .repo
            .restore(record(1, "web", JobStatus::QueuedForLive))
            .await;

        let status = h.service.cancel(id, &authorized()).await.unwrap();

        assert_eq!(status, JobStatus::GoLiveFailed);
        assert_eq!(
            h.tickets.post_deploys(),
            vec![(TicketAction::Cancel, Some(id))]
        );
        assert_eq!(
            h.repo.get(id).await.unwrap().status(),
            JobStatus::GoLiveFailed
        );
    }

    /// Lets another writer save each job right after it is read.
    struct RacingRepo(MemoryJobRepo);

    #[async_trait::async_trait]
    impl JobRepo for RacingRepo {
        async fn get(&self, id: JobId) -> pushdeck_db::DbResult<Job> {
            let job = self.0.get(id).await?;
            self.0.save(&mut job.clone()).await?;
            Ok(job)
        }

        async fn save(&self, job: &mut Job) -> pushdeck_db::DbResult<JobId> {
            self.0.save(job).await
        }

        async fn find_by_status(
            &self,
            query: &pushdeck_db::StatusQuery,
        ) -> pushdeck_db::DbResult<Vec<Job>> {
            self.0.find_by_status(query).await
        }
    }

    #[tokio::test]
    async fn test_cancel_losing_revision_race_reports_conflict() {
        let inner = MemoryJobRepo::new();
        let id = inner.restore(record(1, "web", JobStatus::QueuedForLive)).await;
        let repo = Arc::new(RacingRepo(inner));
        let tickets = Arc::new(FakeTickets::allowing(&["web"]));
        let service = JobService::new(
            repo.clone(),
            tickets.clone(),
            ModuleRegistry::new(["web", "api"]),
        );

        let err = service.cancel(id, &authorized()).await.unwrap_err();

        assert!(matches!(err, Error::Conflict(_)), "{:?}", err);
        assert_eq!(
            tickets.post_deploys(),
            vec![(TicketAction::Cancel, Some(id))]
        );
        assert_eq!(
            repo.0.get(id).await.unwrap().status(),
            JobStatus::QueuedForLive
        );
    }

    #[tokio::test]
    async fn test_cancel_queued_for_live_without_permission() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h
            .repo
            .restore(record(1, "web", JobStatus::QueuedForLive))
            .await;

        let err = h.service.cancel(id, &unprivileged()).await.unwrap_err();

        assert!(matches!(err, Error::NotAuthorized(_)));
        assert!(h.tickets.post_deploys().is_empty());
        assert_eq!(
            h.repo.get(id).await.unwrap().status(),
            JobStatus::QueuedForLive
        );
    }

    #[tokio::test]
    async fn test_cancel_keeps_status_when_ticketing_fails() {
        let h = harness(FakeTickets::allowing(&["web"]).failing_post_deploy());
        let id = h
            .repo
            .restore(record(1, "web", JobStatus::QueuedForLive))
            .await;

        let err = h.service.cancel(id, &authorized()).await.unwrap_err();

        assert!(matches!(err, Error::Upstream(_)));
        assert_eq!(
            h.repo.get(id).await.unwrap().status(),
            JobStatus::QueuedForLive
        );
    }

    #[tokio::test]
    async fn test_cancel_from_running_state_is_invalid() {
        let h = harness(FakeTickets::allowing(&["web"]));
        for (id, status) in [
            (1, JobStatus::Deploying),
            (2, JobStatus::PendingTests),
            (3, JobStatus::TestsPassed),
            (4, JobStatus::GoingLive),
            (5, JobStatus::GoLiveDone),
        ] {
            let id = h.repo.restore(record(id, "web", status)).await;
            let result = h.service.cancel(id, &authorized()).await;
            assert!(
                matches!(result, Err(Error::InvalidTransition { .. })),
                "cancel from {}",
                status
            );
        }
    }

    #[tokio::test]
    async fn test_go_live_with_ticket() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h.repo.restore(record(1, "web", JobStatus::TestsPassed)).await;

        let decision = h.service.go_live(id, &authorized()).await.unwrap();

        assert_eq!(decision, Decision::Applied(JobStatus::QueuedForLive));
        let job = h.repo.get(id).await.unwrap();
        assert_eq!(job.status(), JobStatus::QueuedForLive);
        assert_eq!(job.ticket(), Ticket::new("CHG-100").as_ref());
        assert_eq!(job.user(), Some("ops@example.com"));
        assert_eq!(h.tickets.pre_deploys(), vec![(TicketAction::Deploy, None)]);
    }

    #[tokio::test]
    async fn test_go_live_without_ticket_fails_job() {
        for refused in [None, Some(""), Some("  ")] {
            let h = harness(FakeTickets::allowing(&["web"]).issuing(refused));
            let id = h.repo.restore(record(1, "web", JobStatus::TestsPassed)).await;

            let decision = h.service.go_live(id, &authorized()).await.unwrap();

            assert_eq!(decision, Decision::Applied(JobStatus::GoLiveFailed));
            let job = h.repo.get(id).await.unwrap();
            assert_eq!(job.status(), JobStatus::GoLiveFailed);
            assert!(job.ticket().is_none());
        }
    }

    #[tokio::test]
    async fn test_go_live_without_ticket_drops_stale_ticket() {
        let h = harness(FakeTickets::allowing(&["web"]).issuing(None));
        let mut seeded = record(1, "web", JobStatus::TestsPassed);
        seeded.ticket = Ticket::new("CHG-OLD");
        let id = h.repo.restore(seeded).await;

        let decision = h.service.go_live(id, &authorized()).await.unwrap();

        assert_eq!(decision, Decision::Applied(JobStatus::GoLiveFailed));
        let job = h.repo.get(id).await.unwrap();
        assert_eq!(job.status(), JobStatus::GoLiveFailed);
        assert!(job.ticket().is_none());
    }

    #[tokio::test]
    async fn test_go_live_uses_username_without_email() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h.repo.restore(record(1, "web", JobStatus::TestsPassed)).await;
        let mut actor = unprivileged();
        actor.permissions = authorized().permissions;

        h.service.go_live(id, &actor).await.unwrap();

        assert_eq!(h.repo.get(id).await.unwrap().user(), Some("dev"));
    }

    #[tokio::test]
    async fn test_go_live_refused_without_permission() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h.repo.restore(record(1, "web", JobStatus::TestsPassed)).await;

        let decision = h.service.go_live(id, &unprivileged()).await.unwrap();

        assert_eq!(
            decision,
            Decision::Refused {
                status: JobStatus::TestsPassed,
                reason: GO_LIVE_REFUSED
            }
        );
        let job = h.repo.get(id).await.unwrap();
        assert_eq!(job.status(), JobStatus::TestsPassed);
        assert!(job.user().is_none());
        assert!(h.tickets.pre_deploys().is_empty());
    }

    #[tokio::test]
    async fn test_go_live_refused_for_other_module() {
        let h = harness(FakeTickets::allowing(&["api"]));
        let id = h.repo.restore(record(1, "web", JobStatus::TestsPassed)).await;

        let decision = h.service.go_live(id, &authorized()).await.unwrap();

        assert!(matches!(decision, Decision::Refused { .. }));
    }

    #[tokio::test]
    async fn test_go_live_refused_in_wrong_status() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h.repo.restore(record(1, "web", JobStatus::TestsFailed)).await;

        let decision = h.service.go_live(id, &authorized()).await.unwrap();

        assert_eq!(
            decision,
            Decision::Refused {
                status: JobStatus::TestsFailed,
                reason: GO_LIVE_REFUSED
            }
        );
    }

    #[tokio::test]
    async fn test_go_live_ticketing_error_is_upstream_failure() {
        let h = harness(FakeTickets::allowing(&["web"]).failing_pre_deploy());
        let id = h.repo.restore(record(1, "web", JobStatus::TestsPassed)).await;

        let err = h.service.go_live(id, &authorized()).await.unwrap_err();

        assert!(matches!(err, Error::Upstream(_)));
        assert_eq!(
            h.repo.get(id).await.unwrap().status(),
            JobStatus::TestsPassed
        );
    }

    #[tokio::test]
    async fn test_rollback_creates_new_job() {
        let h = harness(FakeTickets::allowing(&["web"]).issuing(Some("CHG-200")));
        let mut prior = record(7, "web", JobStatus::GoLiveDone);
        prior.ticket = Ticket::new("CHG-7");
        prior.user = Some("someone@example.com".to_string());
        prior.live_job_id = Some("live-3".to_string());
        let id = h.repo.restore(prior.clone()).await;

        let decision = h.service.rollback(id, &authorized()).await.unwrap();

        let Decision::Applied(new_id) = decision else {
            panic!("rollback refused: {:?}", decision);
        };
        assert_ne!(new_id, id);

        let job = h.repo.get(new_id).await.unwrap();
        assert_eq!(job.status(), JobStatus::QueuedForLive);
        assert_eq!(job.rollbacked_from(), Some(id));
        assert_eq!(job.target_module(), "web");
        assert_eq!(job.target_version(), "1.2.3");
        assert_eq!(job.requestor(), "ci-1");
        assert_eq!(job.ticket(), Ticket::new("CHG-200").as_ref());
        assert_eq!(job.user(), Some("ops@example.com"));
        assert!(job.live_job_id().is_none());

        // The ticketing service saw the seeded prior ticket.
        assert_eq!(
            h.tickets.pre_deploys(),
            vec![(TicketAction::Rollback, Some("CHG-7".to_string()))]
        );

        let original = h.repo.get(id).await.unwrap();
        assert_eq!(original.record().unwrap(), prior);
    }

    #[tokio::test]
    async fn test_rollback_without_ticket_clears_seed() {
        let h = harness(FakeTickets::allowing(&["web"]).issuing(None));
        let mut prior = record(7, "web", JobStatus::GoLiveDone);
        prior.ticket = Ticket::new("CHG-7");
        let id = h.repo.restore(prior).await;

        let Decision::Applied(new_id) = h.service.rollback(id, &authorized()).await.unwrap() else {
            panic!("rollback refused");
        };

        let job = h.repo.get(new_id).await.unwrap();
        assert_eq!(job.status(), JobStatus::QueuedForLive);
        assert!(job.ticket().is_none());
    }

    #[tokio::test]
    async fn test_rollback_refused() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let live = h.repo.restore(record(1, "web", JobStatus::GoLiveDone)).await;
        let failed = h
            .repo
            .restore(record(2, "web", JobStatus::GoLiveFailed))
            .await;

        let no_permission = h.service.rollback(live, &unprivileged()).await.unwrap();
        assert_eq!(
            no_permission,
            Decision::Refused {
                status: JobStatus::GoLiveDone,
                reason: ROLLBACK_REFUSED
            }
        );

        let wrong_status = h.service.rollback(failed, &authorized()).await.unwrap();
        assert!(matches!(
            wrong_status,
            Decision::Refused {
                status: JobStatus::GoLiveFailed,
                ..
            }
        ));
        assert_eq!(h.repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_register_test_job_url() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h.repo.restore(record(1, "web", JobStatus::Deploying)).await;

        h.service
            .register_test_job_url(id, "http://ci.test/job/web-tests/12")
            .await
            .unwrap();

        let job = h.repo.get(id).await.unwrap();
        assert_eq!(job.test_job_url(), Some("http://ci.test/job/web-tests/12"));
        assert_eq!(job.status(), JobStatus::Deploying);
    }

    #[tokio::test]
    async fn test_register_test_result() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let passed = h
            .repo
            .restore(record(1, "web", JobStatus::PendingTests))
            .await;
        let failed = h
            .repo
            .restore(record(2, "web", JobStatus::PendingTests))
            .await;

        let status = h
            .service
            .register_test_result(passed, TestOutcome::from_flag("true"))
            .await
            .unwrap();
        assert_eq!(status, JobStatus::TestsPassed);

        let status = h
            .service
            .register_test_result(failed, TestOutcome::from_flag("TRUE"))
            .await
            .unwrap();
        assert_eq!(status, JobStatus::TestsFailed);
    }

    #[tokio::test]
    async fn test_register_test_result_outside_pending_tests() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h.repo.restore(record(1, "web", JobStatus::GoLiveDone)).await;

        let result = h.service.register_test_result(id, TestOutcome::Passed).await;

        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_runner_progress_through_production() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let actor = authorized();
        let id = h.service.create(new_job("web")).await.unwrap();

        assert_eq!(
            h.service.deploy_started(id, "deploy-42").await.unwrap(),
            JobStatus::Deploying
        );
        assert_eq!(
            h.service.deploy_finished(id, true).await.unwrap(),
            JobStatus::PendingTests
        );
        assert_eq!(
            h.service
                .register_test_result(id, TestOutcome::Passed)
                .await
                .unwrap(),
            JobStatus::TestsPassed
        );
        assert_eq!(
            h.service.go_live(id, &actor).await.unwrap(),
            Decision::Applied(JobStatus::QueuedForLive)
        );
        assert_eq!(
            h.service.live_started(id, "live-9").await.unwrap(),
            JobStatus::GoingLive
        );
        assert_eq!(
            h.service.live_finished(id, true).await.unwrap(),
            JobStatus::GoLiveDone
        );

        let job = h.repo.get(id).await.unwrap();
        assert_eq!(job.deployment_job_id(), Some("deploy-42"));
        assert_eq!(job.live_job_id(), Some("live-9"));
    }

    #[tokio::test]
    async fn test_failed_staging_deploy() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h.repo.restore(record(1, "web", JobStatus::Deploying)).await;

        assert_eq!(
            h.service.deploy_finished(id, false).await.unwrap(),
            JobStatus::DeployFailed
        );
        assert!(matches!(
            h.service.deploy_started(id, "again").await,
            Err(Error::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_live_deploy() {
        let h = harness(FakeTickets::allowing(&["web"]));
        let id = h.repo.restore(record(1, "web", JobStatus::GoingLive)).await;

        assert_eq!(
            h.service.live_finished(id, false).await.unwrap(),
            JobStatus::GoLiveFailed
        );
    }

    #[test]
    fn test_outcome_flag_is_literal() {
        assert_eq!(TestOutcome::from_flag("true"), TestOutcome::Passed);
        assert_eq!(TestOutcome::from_flag("True"), TestOutcome::Failed);
        assert_eq!(TestOutcome::from_flag("1"), TestOutcome::Failed);
        assert_eq!(TestOutcome::from_flag(""), TestOutcome::Failed);
    }
}
