//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::COOKIE, request::Parts},
};
use cookie::Cookie;
use std::sync::Arc;
use tracing::{debug, warn};

use super::models::Claims;
use crate::common::{ApiError, AppState};

/// Name of the session cookie set on a successful OAuth callback.
pub const SESSION_COOKIE: &str = "admin_token";

/// Authenticated session extractor
///
/// Reads the session cookie from the request, verifies it with the session
/// codec, and attaches the resolved claims. Fails with 401 when the cookie is
/// absent or does not verify.
#[derive(Debug)]
pub struct SessionUser {
    pub claims: Claims,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app): Extension<Arc<AppState>> = Extension::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match session_cookie_value(parts) {
            Some(token) => token,
            None => {
                warn!("Authentication failed: no session cookie");
                return Err(ApiError::Unauthorized("authentication required".into()));
            }
        };

        match app.codec.verify(&token) {
            Ok(claims) => {
                debug!(
                    login = %claims.login,
                    is_org_member = claims.is_org_member,
                    "Session verified via extractor"
                );
                Ok(SessionUser { claims })
            }
            Err(_) => {
                warn!("Authentication failed: session token did not verify");
                Err(ApiError::Unauthorized("invalid session".into()))
            }
        }
    }
}

/// Organization-membership gate
///
/// Only reachable after `SessionUser` succeeds. Rejects with 403 unless the
/// session claims carry org membership. The deployment profile may disable
/// the check entirely in non-production deployments (explicit dev override).
#[derive(Debug)]
pub struct OrgMember(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for OrgMember
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = SessionUser::from_request_parts(parts, state).await?;

        let Extension(app): Extension<Arc<AppState>> = Extension::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        if app.profile.skip_org_check {
            debug!(login = %user.claims.login, "Org-membership check bypassed (dev override)");
            return Ok(OrgMember(user));
        }

        if !user.claims.is_org_member {
            warn!(login = %user.claims.login, "Access denied: not an organization member");
            return Err(ApiError::Forbidden(
                "organization membership required".into(),
            ));
        }

        Ok(OrgMember(user))
    }
}

fn session_cookie_value(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(COOKIE)?.to_str().ok()?;

    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}
