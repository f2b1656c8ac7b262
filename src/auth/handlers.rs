//! Authentication handlers

use axum::{
    extract::{Extension, Query},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use cookie::{Cookie, SameSite};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::extractors::{SessionUser, SESSION_COOKIE};
use super::github::GitHubError;
use super::models::{CallbackParams, Identity};
use crate::common::{ApiError, AppState};

/// GET /api/auth/github - Start the GitHub OAuth flow
///
/// Redirects to GitHub's authorization page with the environment-selected
/// callback URL.
pub async fn github_login(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Redirect, ApiError> {
    let redirect_uri = state.profile.callback_url();

    let auth_url = state.github.authorize_url(&redirect_uri).map_err(|e| {
        error!(error = %e, "Failed to build GitHub authorize URL");
        ApiError::InternalServer("GitHub OAuth is not configured".to_string())
    })?;

    info!(redirect_uri = %redirect_uri, "Starting GitHub OAuth flow");

    Ok(Redirect::to(&auth_url))
}

/// GET /api/auth/github/callback - Handle the OAuth callback
///
/// Failures redirect back to the admin landing page with an opaque error
/// code; provider error bodies are never exposed to the client.
pub async fn github_callback(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let code = match params.code.filter(|c| !c.is_empty()) {
        Some(code) => code,
        None => {
            warn!("OAuth callback without an authorization code");
            return Ok(Redirect::to("/admin?error=auth_failed").into_response());
        }
    };

    let redirect_uri = state.profile.callback_url();

    let access_token = match state.github.exchange_code(&code, &redirect_uri).await {
        Ok(token) => token,
        Err(GitHubError::TokenExchange) => {
            warn!("Token exchange returned no access token");
            return Ok(Redirect::to("/admin?error=token_failed").into_response());
        }
        Err(e) => {
            error!(error = %e, "Token exchange failed");
            return Ok(Redirect::to("/admin?error=auth_error").into_response());
        }
    };

    let user = match state.github.fetch_user(&access_token).await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "Failed to fetch GitHub user profile");
            return Ok(Redirect::to("/admin?error=auth_error").into_response());
        }
    };

    // Best-effort: failures inside resolution degrade to non-member and the
    // login still succeeds.
    let membership = state
        .github
        .resolve_membership(&access_token, &user.login)
        .await;

    info!(
        login = %user.login,
        org = %state.github.org(),
        membership = ?membership,
        "User authenticated via GitHub OAuth"
    );

    let identity = Identity {
        id: user.id.to_string(),
        login: user.login,
        name: user.name,
        avatar_url: user.avatar_url,
        is_org_member: membership.is_member(),
    };

    let token = match state.codec.mint(&identity) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Failed to mint session token");
            return Ok(Redirect::to("/admin?error=auth_error").into_response());
        }
    };

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.profile.cookie_secure())
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::hours(24))
        .build();

    Ok((
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Redirect::to("/admin"),
    )
        .into_response())
}

/// GET /api/auth/verify - Return the claims of the current session
///
/// 401s come from the `SessionUser` extractor.
pub async fn verify_session(user: SessionUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "user": user.claims }))
}

/// POST /api/auth/logout - Clear the session cookie
///
/// Sessions are stateless; logout is purely client-side cookie removal.
pub async fn logout_handler() -> impl IntoResponse {
    info!("User logout");

    let removal = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(cookie::time::Duration::ZERO)
        .build();

    (
        AppendHeaders([(SET_COOKIE, removal.to_string())]),
        Json(serde_json::json!({ "success": true })),
    )
}
