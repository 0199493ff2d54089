//! The job status transition table.
//!
//! Every status change a job can go through after creation is a row in
//! [`TRANSITIONS`]. Operations look up the row for `(current status, trigger)`,
//! honor its `gated` flag and side effect, then apply it to the job. A pair
//! with no row is an invalid transition.

use serde::{Deserialize, Serialize};

use crate::status::JobStatus;

/// What is asking the job to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Operator cancels a queued job.
    Cancel,
    /// Operator promotes a tested job and the ticketing system issued a ticket.
    GoLive,
    /// Operator promotes a tested job but no ticket was issued.
    TicketDenied,
    TestsPassed,
    TestsFailed,
    DeployStarted,
    DeploySucceeded,
    DeployFailed,
    LiveStarted,
    LiveSucceeded,
    LiveFailed,
}

impl Trigger {
    pub const ALL: [Trigger; 11] = [
        Trigger::Cancel,
        Trigger::GoLive,
        Trigger::TicketDenied,
        Trigger::TestsPassed,
        Trigger::TestsFailed,
        Trigger::DeployStarted,
        Trigger::DeploySucceeded,
        Trigger::DeployFailed,
        Trigger::LiveStarted,
        Trigger::LiveSucceeded,
        Trigger::LiveFailed,
    ];
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self {
            Trigger::Cancel => "cancel",
            Trigger::GoLive => "go live with",
            Trigger::TicketDenied => "deny go live for",
            Trigger::TestsPassed => "pass tests for",
            Trigger::TestsFailed => "fail tests for",
            Trigger::DeployStarted => "start deploying",
            Trigger::DeploySucceeded => "finish deploying",
            Trigger::DeployFailed => "fail deploying",
            Trigger::LiveStarted => "start going live with",
            Trigger::LiveSucceeded => "finish going live with",
            Trigger::LiveFailed => "fail going live with",
        };
        f.write_str(verb)
    }
}

/// Side effect that must succeed before the status change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Tell the ticketing service the deployment was cancelled.
    CancelTicket,
    /// The ticketing service issued a ticket that the job must carry.
    IssueTicket,
    /// Record the build runner's staging deployment job.
    RecordDeploymentJob,
    /// Record the build runner's production deployment job.
    RecordLiveJob,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: JobStatus,
    pub trigger: Trigger,
    pub to: JobStatus,
    /// Whether the authorization gate must pass for the acting user.
    pub gated: bool,
    pub effect: Effect,
}

const fn row(
    from: JobStatus,
    trigger: Trigger,
    to: JobStatus,
    gated: bool,
    effect: Effect,
) -> Transition {
    Transition {
        from,
        trigger,
        to,
        gated,
        effect,
    }
}

pub const TRANSITIONS: &[Transition] = &[
    row(JobStatus::Queued, Trigger::Cancel, JobStatus::DeployFailed, false, Effect::None),
    row(
        JobStatus::QueuedForLive,
        Trigger::Cancel,
        JobStatus::GoLiveFailed,
        true,
        Effect::CancelTicket,
    ),
    row(
        JobStatus::TestsPassed,
        Trigger::GoLive,
        JobStatus::QueuedForLive,
        true,
        Effect::IssueTicket,
    ),
    row(
        JobStatus::TestsPassed,
        Trigger::TicketDenied,
        JobStatus::GoLiveFailed,
        true,
        Effect::None,
    ),
    row(
        JobStatus::PendingTests,
        Trigger::TestsPassed,
        JobStatus::TestsPassed,
        false,
        Effect::None,
    ),
    row(
        JobStatus::PendingTests,
        Trigger::TestsFailed,
        JobStatus::TestsFailed,
        false,
        Effect::None,
    ),
    row(
        JobStatus::Queued,
        Trigger::DeployStarted,
        JobStatus::Deploying,
        false,
        Effect::RecordDeploymentJob,
    ),
    row(
        JobStatus::Deploying,
        Trigger::DeploySucceeded,
        JobStatus::PendingTests,
        false,
        Effect::None,
    ),
    row(
        JobStatus::Deploying,
        Trigger::DeployFailed,
        JobStatus::DeployFailed,
        false,
        Effect::None,
    ),
    row(
        JobStatus::QueuedForLive,
        Trigger::LiveStarted,
        JobStatus::GoingLive,
        false,
        Effect::RecordLiveJob,
    ),
    row(
        JobStatus::GoingLive,
        Trigger::LiveSucceeded,
        JobStatus::GoLiveDone,
        false,
        Effect::None,
    ),
    row(
        JobStatus::GoingLive,
        Trigger::LiveFailed,
        JobStatus::GoLiveFailed,
        false,
        Effect::None,
    ),
];

/// Find the row for `(from, trigger)`.
pub fn lookup(from: JobStatus, trigger: Trigger) -> Option<&'static Transition> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == from && t.trigger == trigger)
}
