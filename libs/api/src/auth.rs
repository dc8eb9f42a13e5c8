use std::fmt::Debug;

use anyhow::Context as _;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName},
};

use crate::{ApiError, ApiState};

/// The user a mutating request acts on behalf of.
#[derive(Clone, Debug, PartialEq)]
pub struct Author {
    pub uid: String,
}

/// Resolves who is making a request.
pub trait IdentityProvider: Debug + Send + Sync {
    fn identify(&self, headers: &HeaderMap) -> Option<Author>;
}

/// Trusts a header set by an authenticating reverse proxy.
#[derive(Clone, Debug)]
pub struct HeaderIdentity {
    header: HeaderName,
    default_uid: Option<String>,
}

impl HeaderIdentity {
    pub fn new(
        header: &str,
        default_uid: Option<String>,
    ) -> anyhow::Result<Self> {
        let header = HeaderName::try_from(header)
            .with_context(|| format!("invalid identity header {header:?}"))?;

        Ok(Self {
            header,
            default_uid: default_uid.filter(|uid| !uid.trim().is_empty()),
        })
    }
}

impl IdentityProvider for HeaderIdentity {
    fn identify(&self, headers: &HeaderMap) -> Option<Author> {
        headers
            .get(&self.header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_uid.clone())
            .map(|uid| Author { uid })
    }
}

#[async_trait]
impl FromRequestParts<ApiState> for Author {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        state
            .identity
            .identify(&parts.headers)
            .ok_or_else(|| ApiError::AuthError("Sign in first.".to_string()))
    }
}
