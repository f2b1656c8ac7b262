// src/main.rs
use axum::{extract::Extension, routing::get, Json, Router};
use chrono::Utc;
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod auth;
mod common;
mod posts;
mod services;

use auth::github::GitHubService;
use auth::SessionCodec;
use common::profile::log_profile_status;
use common::{AppState, DeploymentProfile};
use services::ImageService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://geoboard.db".to_string());
    let uploads_dir =
        env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads/images".to_string());
    let github_client_id = env::var("GITHUB_CLIENT_ID").ok().filter(|v| !v.is_empty());
    let github_client_secret = env::var("GITHUB_CLIENT_SECRET")
        .ok()
        .filter(|v| !v.is_empty());
    let github_org = env::var("GITHUB_ORG").unwrap_or_else(|_| "Krz-Tech".to_string());

    // Missing session secret is fatal: there is no insecure fallback.
    let codec = SessionCodec::from_env()
        .map_err(|e| anyhow::anyhow!("{} (set JWT_SECRET)", e))?;

    let profile = DeploymentProfile::from_env();
    log_profile_status(&profile);

    if github_client_id.is_none() {
        warn!("GITHUB_CLIENT_ID not set - OAuth login will be unavailable");
    }

    // ========================================================================
    // DIRECTORY AND DATABASE SETUP
    // ========================================================================

    let images = ImageService::new(PathBuf::from(&uploads_dir));
    images.ensure_dir().await?;

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let github = Arc::new(GitHubService::new(
        github_client_id,
        github_client_secret,
        github_org,
    ));

    let port = profile.local_port;

    let app_state = AppState {
        db: pool,
        images,
        codec,
        github,
        profile,
    };

    let shared = Arc::new(app_state);

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(posts::posts_routes())
        .route("/health", get(health))
        .layer(Extension(shared))
        .layer({
            let cors_origins = env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:11100".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
