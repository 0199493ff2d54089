//! Job status and target environment.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Lifecycle state of a deployment job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Waiting for the build runner to pick up the staging deploy.
    Queued,
    /// Staging deploy running.
    Deploying,
    /// Deployed to staging, waiting on the test run.
    PendingTests,
    TestsPassed,
    TestsFailed,
    DeployFailed,
    /// Approved for production, holding a ticket.
    QueuedForLive,
    GoingLive,
    GoLiveDone,
    GoLiveFailed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 10] = [
        JobStatus::Queued,
        JobStatus::Deploying,
        JobStatus::PendingTests,
        JobStatus::TestsPassed,
        JobStatus::TestsFailed,
        JobStatus::DeployFailed,
        JobStatus::QueuedForLive,
        JobStatus::GoingLive,
        JobStatus::GoLiveDone,
        JobStatus::GoLiveFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Deploying => "DEPLOYING",
            JobStatus::PendingTests => "PENDING_TESTS",
            JobStatus::TestsPassed => "TESTS_PASSED",
            JobStatus::TestsFailed => "TESTS_FAILED",
            JobStatus::DeployFailed => "DEPLOY_FAILED",
            JobStatus::QueuedForLive => "QUEUED_FOR_LIVE",
            JobStatus::GoingLive => "GOING_LIVE",
            JobStatus::GoLiveDone => "GO_LIVE_DONE",
            JobStatus::GoLiveFailed => "GO_LIVE_FAILED",
        }
    }

    /// Terminal states are kept as history and never move again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::DeployFailed
                | JobStatus::TestsFailed
                | JobStatus::GoLiveDone
                | JobStatus::GoLiveFailed
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown job status: {}", s)))
    }
}

/// Deploy target environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            _ => Err(Error::InvalidInput(format!("unknown environment: {}", s))),
        }
    }
}
