//! Job lifecycle commands.

use anyhow::Result;
use pushdeck_core::JobId;
use serde_json::json;

use super::{Client, print_envelope};

fn job_path(id: &str, action: &str) -> Result<String> {
    let id: JobId = id.parse()?;
    Ok(format!("api/v1/jobs/{}/{}", id, action))
}

pub async fn create(client: &Client, module: &str, version: &str, requestor: &str) -> Result<()> {
    let body = json!({
        "module": module,
        "version": version,
        "requestor": requestor,
    });
    print_envelope(&client.post("api/v1/jobs", &body).await?)
}

pub async fn status(client: &Client, id: &str) -> Result<()> {
    print_envelope(&client.get(&job_path(id, "status")?, &[]).await?)
}

pub async fn cancel(client: &Client, id: &str) -> Result<()> {
    print_envelope(&client.post(&job_path(id, "cancel")?, &json!({})).await?)
}

pub async fn go_live(client: &Client, id: &str) -> Result<()> {
    print_envelope(&client.post(&job_path(id, "go-live")?, &json!({})).await?)
}

pub async fn rollback(client: &Client, id: &str) -> Result<()> {
    print_envelope(&client.post(&job_path(id, "rollback")?, &json!({})).await?)
}

pub async fn test_result(client: &Client, id: &str, success: &str) -> Result<()> {
    let id: JobId = id.parse()?;
    let body = json!({ "jobId": id, "success": success });
    print_envelope(&client.post("api/v1/jobs/test-result", &body).await?)
}
