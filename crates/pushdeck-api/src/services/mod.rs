//! HTTP clients for the external collaborators.

pub mod build_runner;
pub mod identity;
pub mod ticketing;

pub use build_runner::UrlBuildRunner;
pub use identity::HttpIdentityProvider;
pub use ticketing::HttpTicketService;

use pushdeck_config::EndpointConfig;
use url::Url;

/// Error talking to a collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    Url(String),
}

impl From<ServiceError> for pushdeck_core::Error {
    fn from(err: ServiceError) -> Self {
        pushdeck_core::Error::Upstream(err.to_string())
    }
}

/// A reqwest client bound to one collaborator's base URL.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    client: reqwest::Client,
    base: Url,
}

impl Endpoint {
    pub(crate) fn new(config: &EndpointConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("pushdeck")
            .build()
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base: with_trailing_slash(&config.url),
        })
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|e| ServiceError::Url(format!("{}: {}", path, e)))
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// `join` replaces the last path segment unless the base ends with a slash.
pub(crate) fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Turn a non-success response into [`ServiceError::Api`].
pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Api {
        status: status.as_u16(),
        body,
    })
}
