//! Session token extraction.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use std::convert::Infallible;

/// Cookie set by the dashboard login flow.
pub const SESSION_COOKIE: &str = "pushdeck_session";

/// Query parameter accepted from scripted callers.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// The caller's session token, if any.
///
/// Looked up in the `Authorization: Bearer` header, then the session cookie,
/// then the `access_token` query parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    fn from_parts(parts: &Parts) -> Self {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);
        if bearer.is_some() {
            return Self(bearer);
        }

        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get(SESSION_COOKIE).filter(|c| !c.value().is_empty()) {
            return Self(Some(cookie.value().to_string()));
        }

        let query = parts.uri.query().unwrap_or_default();
        let token = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, value)| key == ACCESS_TOKEN_PARAM && !value.is_empty())
            .map(|(_, value)| value.into_owned());
        Self(token)
    }
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
