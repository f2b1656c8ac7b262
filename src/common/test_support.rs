// src/common/test_support.rs
//! Shared fixtures for in-tree tests

use axum::{extract::Extension, Router};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tempfile::TempDir;

use crate::auth::github::GitHubService;
use crate::auth::models::Identity;
use crate::auth::SessionCodec;
use crate::common::{AppState, DeploymentProfile};
use crate::services::ImageService;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const TEST_ORG: &str = "Krz-Tech";

pub struct TestContext {
    pub state: Arc<AppState>,
    /// Keeps the uploads directory alive for the duration of the test.
    pub uploads: TempDir,
}

/// Production-profile context: org-membership gate active, no dev bypass.
pub async fn test_context() -> TestContext {
    test_context_with(None, false).await
}

pub async fn test_context_with(
    github: Option<GitHubService>,
    skip_org_check: bool,
) -> TestContext {
    let uploads = tempfile::tempdir().expect("tempdir");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    crate::common::migrations::run_migrations(&pool)
        .await
        .expect("migrations");

    let images = ImageService::new(uploads.path().to_path_buf());
    images.ensure_dir().await.expect("uploads dir");

    let github = Arc::new(github.unwrap_or_else(|| {
        GitHubService::new(
            Some("client-id".to_string()),
            Some("client-secret".to_string()),
            TEST_ORG.to_string(),
        )
    }));

    // The dev bypass only exists on non-production profiles.
    let public_host = if skip_org_check {
        None
    } else {
        Some("board.example.net".to_string())
    };

    let state = Arc::new(AppState {
        db: pool,
        images,
        codec: SessionCodec::new(TEST_SECRET.to_string()),
        github,
        profile: DeploymentProfile {
            public_host,
            local_port: 8080,
            skip_org_check,
        },
    });

    TestContext { state, uploads }
}

/// Full application router wired against the given state.
pub fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(crate::auth::auth_routes())
        .merge(crate::posts::posts_routes())
        .layer(Extension(state))
}

pub fn test_identity(is_org_member: bool) -> Identity {
    Identity {
        id: "1234".to_string(),
        login: "octocat".to_string(),
        name: Some("Octo Cat".to_string()),
        avatar_url: Some("https://example.test/avatar.png".to_string()),
        is_org_member,
    }
}

/// Serve a router on an ephemeral local port; used to mock the identity
/// provider in resolver tests.
pub async fn spawn_mock_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });

    format!("http://{}", addr)
}
