// src/posts/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use super::handlers;

/// Uploads are capped at 10MB.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Creates and returns the posts router
///
/// # Routes
/// - `POST /api/posts` - Submit a post (multipart, optional image)
/// - `GET /api/posts` - Public listing
/// - `GET /api/posts/admin` - Full listing (org members only)
/// - `GET /api/posts/:id` - Post detail
/// - `GET /uploads/images/:filename` - Stored images
pub fn posts_routes() -> Router {
    Router::new()
        .route(
            "/api/posts",
            post(handlers::create_post).get(handlers::list_posts),
        )
        .route("/api/posts/admin", get(handlers::admin_list_posts))
        .route("/api/posts/:id", get(handlers::get_post))
        .route("/uploads/images/:filename", get(handlers::serve_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
