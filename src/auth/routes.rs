//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /api/auth/github` - Redirect to GitHub's authorize URL
/// - `GET /api/auth/github/callback` - OAuth callback (sets session cookie)
/// - `GET /api/auth/verify` - Current session claims
/// - `POST /api/auth/logout` - Clear the session cookie
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/github", get(handlers::github_login))
        .route(
            "/api/auth/github/callback",
            get(handlers::github_callback),
        )
        .route("/api/auth/verify", get(handlers::verify_session))
        .route("/api/auth/logout", post(handlers::logout_handler))
}
