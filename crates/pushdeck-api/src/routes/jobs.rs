//! Job lifecycle endpoints.
//!
//! Every handler answers 200 with an [`Envelope`]; failures become error
//! envelopes instead of HTTP error codes.

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::routing::{get, post};
use pushdeck_core::{Error, JobId, Result};
use pushdeck_jobs::{Decision, NewJob, TestOutcome};
use serde::Deserialize;

use crate::AppState;
use crate::envelope::Envelope;
use crate::session::SessionToken;

const INSERTED: &str = "Job inserted in queue";
const NOT_INSERTED: &str = "Job not inserted in queue";
const STATUS_FAILED: &str = "Problems trying to get job status";
const CANCEL_FAILED: &str = "Problems trying to cancel job";
const GO_LIVE_FAILED: &str = "Problems trying to go live with Job";
const TEST_URL_REGISTERED: &str = "Test job url registered";
const TEST_URL_FAILED: &str = "Problems trying to register Test job url";
const TEST_RESULT_REGISTERED: &str = "Test result registered";
const TEST_RESULT_FAILED: &str = "Problems trying to register Test result";
const PROGRESS_REGISTERED: &str = "Job progress registered";
const PROGRESS_FAILED: &str = "Problems trying to register job progress";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_job))
        .route("/test-job-url", post(register_test_job_url))
        .route("/test-result", post(register_test_result))
        .route("/{id}/status", get(job_status))
        .route("/{id}/cancel", post(cancel_job))
        .route("/{id}/go-live", post(go_live))
        .route("/{id}/rollback", post(rollback))
        .route("/{id}/test-result/{success}", post(register_test_result_by_path))
        .route("/{id}/deploy-started", post(deploy_started))
        .route("/{id}/deploy-finished", post(deploy_finished))
        .route("/{id}/live-started", post(live_started))
        .route("/{id}/live-finished", post(live_finished))
}

fn reply<T>(failure: &str, result: Result<T>, ok: impl FnOnce(T) -> Envelope) -> Envelope {
    match result {
        Ok(value) => ok(value),
        Err(err) => Envelope::failure(failure, err),
    }
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| Error::InvalidInput(e.body_text()))
}

/// Test result flag: the string `"true"` or a JSON boolean.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn outcome(&self) -> TestOutcome {
        match self {
            Flag::Bool(true) => TestOutcome::Passed,
            Flag::Bool(false) => TestOutcome::Failed,
            Flag::Text(text) => TestOutcome::from_flag(text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TestJobUrlRequest {
    #[serde(rename = "jobId")]
    job_id: JobId,
    test_job_url: String,
}

#[derive(Debug, Deserialize)]
struct TestResultRequest {
    #[serde(rename = "jobId")]
    job_id: JobId,
    success: Flag,
}

#[derive(Debug, Deserialize)]
struct DeployStartedRequest {
    deployment_job_id: String,
}

#[derive(Debug, Deserialize)]
struct LiveStartedRequest {
    live_job_id: String,
}

#[derive(Debug, Deserialize)]
struct FinishedRequest {
    success: bool,
}

async fn create_job(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewJob>, JsonRejection>,
) -> Envelope {
    let result = async {
        let request = body(payload)?;
        state.jobs.create(request).await
    }
    .await;
    reply(NOT_INSERTED, result, |id| {
        Envelope::success(INSERTED).with_job_id(id)
    })
}

async fn job_status(State(state): State<AppState>, Path(id): Path<String>) -> Envelope {
    let result = async {
        let id: JobId = id.parse()?;
        let status = state.jobs.status(id).await?;
        Ok::<_, Error>((id, status))
    }
    .await;
    reply(STATUS_FAILED, result, |(id, status)| Envelope::job(id, status))
}

async fn cancel_job(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<String>,
) -> Envelope {
    let result = async {
        let id: JobId = id.parse()?;
        let actor = state.actor(&token).await?;
        let status = state.jobs.cancel(id, &actor).await?;
        Ok::<_, Error>((id, status))
    }
    .await;
    reply(CANCEL_FAILED, result, |(id, status)| Envelope::job(id, status))
}

async fn go_live(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<String>,
) -> Envelope {
    let result = async {
        let id: JobId = id.parse()?;
        let actor = state.actor(&token).await?;
        let decision = state.jobs.go_live(id, &actor).await?;
        Ok::<_, Error>((id, decision))
    }
    .await;
    reply(GO_LIVE_FAILED, result, |(id, decision)| match decision {
        Decision::Applied(status) => Envelope::job(id, status),
        Decision::Refused { status, reason } => Envelope::job(id, status).with_message(reason),
    })
}

async fn rollback(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<String>,
) -> Envelope {
    let result = async {
        let id: JobId = id.parse()?;
        let actor = state.actor(&token).await?;
        let decision = state.jobs.rollback(id, &actor).await?;
        Ok::<_, Error>((id, decision))
    }
    .await;
    reply(NOT_INSERTED, result, |(id, decision)| match decision {
        Decision::Applied(new_id) => Envelope::success(INSERTED).with_job_id(new_id),
        Decision::Refused { status, reason } => Envelope::job(id, status).with_message(reason),
    })
}

async fn register_test_job_url(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TestJobUrlRequest>, JsonRejection>,
) -> Envelope {
    let result = async {
        let request = body(payload)?;
        state
            .jobs
            .register_test_job_url(request.job_id, &request.test_job_url)
            .await
    }
    .await;
    reply(TEST_URL_FAILED, result, |()| {
        Envelope::success(TEST_URL_REGISTERED)
    })
}

async fn register_test_result(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TestResultRequest>, JsonRejection>,
) -> Envelope {
    let result = async {
        let request = body(payload)?;
        let status = state
            .jobs
            .register_test_result(request.job_id, request.success.outcome())
            .await?;
        Ok::<_, Error>((request.job_id, status))
    }
    .await;
    reply(TEST_RESULT_FAILED, result, |(id, status)| {
        Envelope::job(id, status).with_message(TEST_RESULT_REGISTERED)
    })
}

async fn register_test_result_by_path(
    State(state): State<AppState>,
    Path((id, success)): Path<(String, String)>,
) -> Envelope {
    let result = async {
        let id: JobId = id.parse()?;
        let status = state
            .jobs
            .register_test_result(id, TestOutcome::from_flag(&success))
            .await?;
        Ok::<_, Error>((id, status))
    }
    .await;
    reply(TEST_RESULT_FAILED, result, |(id, status)| {
        Envelope::job(id, status).with_message(TEST_RESULT_REGISTERED)
    })
}

async fn deploy_started(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<DeployStartedRequest>, JsonRejection>,
) -> Envelope {
    let result = async {
        let id: JobId = id.parse()?;
        let request = body(payload)?;
        let status = state
            .jobs
            .deploy_started(id, &request.deployment_job_id)
            .await?;
        Ok::<_, Error>((id, status))
    }
    .await;
    progress_reply(result)
}

async fn deploy_finished(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<FinishedRequest>, JsonRejection>,
) -> Envelope {
    let result = async {
        let id: JobId = id.parse()?;
        let request = body(payload)?;
        let status = state.jobs.deploy_finished(id, request.success).await?;
        Ok::<_, Error>((id, status))
    }
    .await;
    progress_reply(result)
}

async fn live_started(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<LiveStartedRequest>, JsonRejection>,
) -> Envelope {
    let result = async {
        let id: JobId = id.parse()?;
        let request = body(payload)?;
        let status = state.jobs.live_started(id, &request.live_job_id).await?;
        Ok::<_, Error>((id, status))
    }
    .await;
    progress_reply(result)
}

async fn live_finished(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<FinishedRequest>, JsonRejection>,
) -> Envelope {
    let result = async {
        let id: JobId = id.parse()?;
        let request = body(payload)?;
        let status = state.jobs.live_finished(id, request.success).await?;
        Ok::<_, Error>((id, status))
    }
    .await;
    progress_reply(result)
}

fn progress_reply(result: Result<(JobId, pushdeck_core::JobStatus)>) -> Envelope {
    reply(PROGRESS_FAILED, result, |(id, status)| {
        Envelope::job(id, status).with_message(PROGRESS_REGISTERED)
    })
}
