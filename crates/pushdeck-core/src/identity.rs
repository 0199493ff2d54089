//! Identity and permission resolution.
//!
//! The acting user is resolved once per request into an [`Actor`] and passed
//! explicitly to every operation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Who a session token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Opaque permission set, only interpreted by the ticketing service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(pub Vec<String>);

/// The user performing an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub identity: Option<Identity>,
    pub permissions: Option<Permissions>,
}

impl Actor {
    /// No session. Never passes the authorization gate.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(identity: Identity, permissions: Option<Permissions>) -> Self {
        Self {
            identity: Some(identity),
            permissions,
        }
    }

    /// Email if the user has one, otherwise username.
    pub fn display_name(&self) -> Option<&str> {
        let identity = self.identity.as_ref()?;
        match identity.email.as_deref() {
            Some(email) if !email.is_empty() => Some(email),
            _ => Some(identity.username.as_str()),
        }
    }
}

/// Trait for session/identity backends.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The user behind a session token, if the token is valid.
    async fn current_actor(&self, token: &str) -> Result<Option<Identity>>;

    /// The user's permission set, if they have one.
    async fn resolve_permissions(&self, identity: &Identity) -> Result<Option<Permissions>>;
}

/// Resolve the actor for an optional session token.
pub async fn resolve_actor(
    provider: &dyn IdentityProvider,
    token: Option<&str>,
) -> Result<Actor> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(Actor::anonymous());
    };
    let Some(identity) = provider.current_actor(token).await? else {
        return Ok(Actor::anonymous());
    };
    let permissions = provider.resolve_permissions(&identity).await?;
    Ok(Actor::new(identity, permissions))
}
