//! Job identifiers.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Identifier of a persisted job.
///
/// Assigned by the store on first save and never changed afterwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct JobId(i64);

impl JobId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the underlying integer.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for JobId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<JobId> for i64 {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl std::str::FromStr for JobId {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(Self)
            .map_err(|_| Error::InvalidInput(format!("invalid job id '{}'", s)))
    }
}
