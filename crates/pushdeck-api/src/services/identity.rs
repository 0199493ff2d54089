//! Session and permission lookups against the identity service.

use async_trait::async_trait;
use pushdeck_config::EndpointConfig;
use pushdeck_core::{Identity, IdentityProvider, Permissions, Result};
use reqwest::StatusCode;
use serde::Deserialize;

use super::{Endpoint, ServiceError, check};

#[derive(Debug, Deserialize)]
struct PermissionsResponse {
    permissions: Option<Permissions>,
}

/// Resolves `GET {base}/session` (bearer token) and
/// `GET {base}/users/{username}/permissions`.
///
/// Unknown sessions and users (401/404) resolve to `None`.
pub struct HttpIdentityProvider {
    endpoint: Endpoint,
}

impl HttpIdentityProvider {
    pub fn new(config: &EndpointConfig) -> std::result::Result<Self, ServiceError> {
        Ok(Self {
            endpoint: Endpoint::new(config)?,
        })
    }

    fn permissions_path(username: &str) -> String {
        format!("users/{}/permissions", urlencoding::encode(username))
    }
}

fn is_unknown(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn current_actor(&self, token: &str) -> Result<Option<Identity>> {
        let response = self
            .endpoint
            .client()
            .get(self.endpoint.url("session")?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        if is_unknown(response.status()) {
            return Ok(None);
        }

        let identity = check(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;
        Ok(Some(identity))
    }

    async fn resolve_permissions(&self, identity: &Identity) -> Result<Option<Permissions>> {
        let url = self
            .endpoint
            .url(&Self::permissions_path(&identity.username))?;
        let response = self
            .endpoint
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        if is_unknown(response.status()) {
            return Ok(None);
        }

        let body: PermissionsResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;
        Ok(body.permissions)
    }
}
