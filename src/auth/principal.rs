//! Token to principal resolution.
//!
//! Every failure (no header, bad scheme, bad signature, expired token, unknown
//! subject, storage error) ends in the same [`Unauthorized`], so a caller
//! cannot tell which check tripped.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    auth::{jwt::JwtKeys, services},
    error::ApiError,
    state::AppState,
    users::{repo::UserStore, repo_types::User},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("could not validate credentials")]
pub struct Unauthorized;

/// The authenticated user for one request.
#[derive(Debug, Clone)]
pub struct Principal(pub User);

impl Principal {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

pub async fn resolve(
    keys: &JwtKeys,
    store: &dyn UserStore,
    token: &str,
) -> Result<Principal, Unauthorized> {
    let claims = keys.decode(token).map_err(|reason| {
        debug!(%reason, "token refused");
        Unauthorized
    })?;

    match store.find_by_email(&claims.sub).await {
        Ok(Some(user)) => Ok(Principal(user)),
        Ok(None) => {
            debug!(sub = %claims.sub, "token subject has no account");
            Err(Unauthorized)
        }
        Err(e) => {
            error!(error = %e, "principal lookup failed");
            Err(Unauthorized)
        }
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extracts and validates the bearer token, yielding the resolved user.
pub struct CurrentUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            debug!("missing or malformed Authorization header");
            Unauthorized
        })?;
        let principal = services::authenticate(state.users.as_ref(), &state.keys, token).await?;
        Ok(CurrentUser(principal))
    }
}
