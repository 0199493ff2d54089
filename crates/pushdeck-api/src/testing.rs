//! In-process router with fake collaborators, for route tests.

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use pushdeck_config::parse_system_config;
use pushdeck_core::{
    Environment, Identity, IdentityProvider, Job, JobId, JobRecord, JobStatus, Permissions,
    Result, Ticket, TicketAction, TicketService,
};
use pushdeck_db::{JobRepo, MemoryJobRepo};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;

use crate::routes;
use crate::services::UrlBuildRunner;
use crate::state::{AppState, Collaborators};

const CONFIG: &str = r#"
    modules "web" "api"
    version-link url-prefix="https://git.test/" uri-version="/tree/"
"#;

/// Issues `CHG-1` and lets the release managers deploy anything.
struct FakeTickets;

#[async_trait]
impl TicketService for FakeTickets {
    async fn pre_deploy(&self, _job: &Job, _action: TicketAction) -> Result<Option<Ticket>> {
        Ok(Ticket::new("CHG-1"))
    }

    async fn post_deploy(&self, _job: &Job, _action: TicketAction) -> Result<()> {
        Ok(())
    }

    async fn can_member_deploy(&self, permissions: &Permissions, _module: &str) -> Result<bool> {
        Ok(permissions.0.iter().any(|p| p == "release-managers"))
    }
}

/// Knows a single session, `ops-token`.
struct FakeIdentity;

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn current_actor(&self, token: &str) -> Result<Option<Identity>> {
        Ok((token == "ops-token").then(|| Identity {
            username: "ops".to_string(),
            email: Some("ops@example.com".to_string()),
        }))
    }

    async fn resolve_permissions(&self, _identity: &Identity) -> Result<Option<Permissions>> {
        Ok(Some(Permissions(vec!["release-managers".to_string()])))
    }
}

pub struct TestApp {
    repo: Arc<MemoryJobRepo>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let config = parse_system_config(CONFIG).unwrap();
        let repo = Arc::new(MemoryJobRepo::new());
        let state = AppState::from_parts(
            &config,
            Collaborators {
                repo: repo.clone(),
                tickets: Arc::new(FakeTickets),
                identity: Arc::new(FakeIdentity),
                runner: Arc::new(UrlBuildRunner::new(&Url::parse("http://ci.test").unwrap())),
            },
        );
        Self {
            repo,
            router: routes::router(state),
        }
    }

    pub async fn seed(&self, record: JobRecord) -> JobId {
        self.repo.restore(record).await
    }

    pub async fn stored(&self, id: JobId) -> Job {
        self.repo.get(id).await.unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn get_raw(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str) -> Value {
        let (status, body) = self.get_raw(uri).await;
        assert_eq!(status, StatusCode::OK, "GET {}: {}", uri, body);
        body
    }

    pub async fn get_as(&self, uri: &str, token: &str) -> Value {
        let request = Request::get(uri)
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = self.send(request).await;
        assert_eq!(status, StatusCode::OK, "GET {}: {}", uri, body);
        body
    }

    pub async fn post(&self, uri: &str, json: Value) -> Value {
        self.post_request(uri, json, None).await
    }

    pub async fn post_as(&self, uri: &str, json: Value, token: &str) -> Value {
        self.post_request(uri, json, Some(token)).await
    }

    async fn post_request(&self, uri: &str, json: Value, token: Option<&str>) -> Value {
        let mut request = Request::post(uri).header("content-type", "application/json");
        if let Some(token) = token {
            request = request.header("cookie", format!("pushdeck_session={}", token));
        }
        let request = request.body(Body::from(json.to_string())).unwrap();

        let (status, body) = self.send(request).await;
        // Lifecycle endpoints answer 200 even when the operation fails.
        assert_eq!(status, StatusCode::OK, "POST {}: {}", uri, body);
        body
    }
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
