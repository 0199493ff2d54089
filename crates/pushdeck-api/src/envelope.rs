//! Uniform JSON reply of mutating endpoints.

use axum::Json;
use axum::response::{IntoResponse, Response};
use pushdeck_core::{JobId, JobStatus};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

/// `{status, message, job_id, job_status}` on success,
/// `{status, message, detail}` on error. Always answered with 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Envelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Outcome::Success,
            message: Some(message.into()),
            job_id: None,
            job_status: None,
            detail: None,
        }
    }

    /// A job and the status it is in now.
    pub fn job(id: JobId, status: JobStatus) -> Self {
        Self {
            status: Outcome::Success,
            message: None,
            job_id: Some(id),
            job_status: Some(status),
            detail: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_job_id(mut self, id: JobId) -> Self {
        self.job_id = Some(id);
        self
    }

    /// Error reply. The failure is logged with its detail.
    pub fn failure(message: &str, detail: impl Display) -> Self {
        let detail = detail.to_string();
        error!(detail = %detail, "{}", message);
        Self {
            status: Outcome::Error,
            message: Some(message.to_string()),
            job_id: None,
            job_status: None,
            detail: Some(detail),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Outcome::Success
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
