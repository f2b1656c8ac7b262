// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::github::GitHubService;
use crate::auth::session::SessionCodec;
use crate::common::profile::DeploymentProfile;
use crate::services::images::ImageService;

/// Application state containing the database pool, services, and configuration.
///
/// Everything in here is read-only after startup, so the state is shared as a
/// plain `Arc` across concurrent request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub images: ImageService,
    pub codec: SessionCodec,
    pub github: Arc<GitHubService>,
    pub profile: DeploymentProfile,
}
