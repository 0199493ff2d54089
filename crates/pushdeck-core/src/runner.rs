//! Build runner contract.

use crate::Result;
use crate::job::Job;

/// The external system that builds, deploys and tests jobs.
///
/// Pushdeck never drives it; it only links to it.
pub trait BuildRunner: Send + Sync {
    /// URL of the console for the build that requested `job`.
    fn console_url(&self, job: &Job) -> Result<String>;
}
