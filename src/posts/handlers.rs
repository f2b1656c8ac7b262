// src/posts/handlers.rs
//! Post submission pipeline and query surface

use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::models::{Post, PostSubmission, PublicPost};
use super::validators::{parse_coordinate, PostValidator, LATITUDE_RANGE, LONGITUDE_RANGE};
use crate::auth::{OrgMember, SessionUser};
use crate::common::{ApiError, AppState, Validator};

const DEFAULT_AUTHOR: &str = "Anonymous";

/// POST /api/posts - Submit a new post (multipart)
///
/// Pipeline order: collect fields, validate, coerce coordinates, then
/// normalize and write the image, then insert. Coordinate validation happens
/// before the image write, so a rejected submission never leaves an orphaned
/// file behind.
///
/// An authenticated session is optional; when present, its display name (or
/// login) overrides any client-supplied nickname.
pub async fn create_post(
    Extension(state): Extension<Arc<AppState>>,
    user: Option<SessionUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let submission = collect_submission(multipart).await?;

    let validation = PostValidator.validate(&submission);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let latitude = parse_coordinate(submission.latitude.as_deref(), LATITUDE_RANGE)
        .ok_or_else(|| {
            warn!(raw = ?submission.latitude, "Rejected submission: latitude did not coerce");
            ApiError::InvalidCoordinates(
                "latitude must be a finite number between -90 and 90".to_string(),
            )
        })?;
    let longitude = parse_coordinate(submission.longitude.as_deref(), LONGITUDE_RANGE)
        .ok_or_else(|| {
            warn!(raw = ?submission.longitude, "Rejected submission: longitude did not coerce");
            ApiError::InvalidCoordinates(
                "longitude must be a finite number between -180 and 180".to_string(),
            )
        })?;

    // A failed normalization or write rejects the whole submission; no post
    // row is created with a silently missing image.
    let image_path = match &submission.image {
        Some(data) => Some(state.images.store(data).await?),
        None => None,
    };

    let (author_label, author_login) = resolve_author(&user, submission.nickname.as_deref());

    let insert = sqlx::query(
        r#"
        INSERT INTO posts (title, description, latitude, longitude, image_path, nickname, author_login)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&submission.title)
    .bind(&submission.description)
    .bind(latitude)
    .bind(longitude)
    .bind(&image_path)
    .bind(&author_label)
    .bind(&author_login)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let id = insert.last_insert_rowid();

    // Fetch back the canonical stored record, server-assigned id and
    // timestamp included.
    let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        post_id = id,
        has_image = post.image_path.is_some(),
        author = %post.nickname,
        "Post created"
    );

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/posts - Public listing, newest first
///
/// Columns are selected explicitly so the projection stays closed even when
/// the table grows admin-only columns.
pub async fn list_posts(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<PublicPost>>, ApiError> {
    let posts = sqlx::query_as::<_, PublicPost>(
        r#"
        SELECT id, title, description, latitude, longitude, image_path, nickname, created_at
        FROM posts
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    debug!(post_count = posts.len(), "Loaded public post listing");

    Ok(Json(posts))
}

/// GET /api/posts/admin - Full listing for organization members
pub async fn admin_list_posts(
    Extension(state): Extension<Arc<AppState>>,
    member: OrgMember,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts =
        sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC, id DESC")
            .fetch_all(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    debug!(
        post_count = posts.len(),
        login = %member.0.claims.login,
        "Loaded admin post listing"
    );

    Ok(Json(posts))
}

/// GET /api/posts/:id - Post detail
pub async fn get_post(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<PublicPost>, ApiError> {
    let post = sqlx::query_as::<_, PublicPost>(
        r#"
        SELECT id, title, description, latitude, longitude, image_path, nickname, created_at
        FROM posts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    match post {
        Some(post) => Ok(Json(post)),
        None => Err(ApiError::NotFound("Post not found".to_string())),
    }
}

/// GET /uploads/images/:filename - Serve stored images
pub async fn serve_image(
    Extension(state): Extension<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Filenames are generated server-side; anything path-like is bogus.
    if filename.contains('/') || filename.contains("..") {
        return Err(ApiError::NotFound("Image not found".to_string()));
    }

    let file_path = state.images.path_for(&filename);

    let content = match tokio::fs::read(&file_path).await {
        Ok(content) => content,
        Err(_) => return Err(ApiError::NotFound("Image not found".to_string())),
    };

    let content_type = content_type_from_extension(&filename);

    Ok((
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, content_type)],
        content,
    ))
}

// Helper functions

/// Drain the multipart stream into a `PostSubmission`.
///
/// The image filter runs here: a file part whose declared media type is not
/// in the image family is rejected before anything else happens.
async fn collect_submission(mut multipart: Multipart) -> Result<PostSubmission, ApiError> {
    let mut submission = PostSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("malformed multipart body".to_string()))?
    {
        match field.name() {
            Some("title") => submission.title = read_text(field).await?,
            Some("description") => submission.description = read_text(field).await?,
            Some("latitude") => submission.latitude = Some(read_text(field).await?),
            Some("longitude") => submission.longitude = Some(read_text(field).await?),
            Some("nickname") => {
                submission.nickname = Some(read_text(field).await?).filter(|s| !s.is_empty())
            }
            Some("image") => {
                let declared_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest("invalid image upload".to_string()))?;

                // Browsers send an empty file part when no photo was chosen.
                if data.is_empty() {
                    continue;
                }

                match declared_type {
                    Some(ct) if ct.starts_with("image/") => {}
                    _ => {
                        return Err(ApiError::UnsupportedMediaType(
                            "only image uploads are accepted".to_string(),
                        ))
                    }
                }

                submission.image = Some(data.to_vec());
            }
            _ => {}
        }
    }

    Ok(submission)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|_| ApiError::BadRequest("malformed multipart field".to_string()))
}

/// The authenticated identity always wins over the client-supplied nickname;
/// with neither, the author label defaults to "Anonymous".
fn resolve_author(
    user: &Option<SessionUser>,
    nickname: Option<&str>,
) -> (String, Option<String>) {
    match user {
        Some(session) => {
            let label = session
                .claims
                .name
                .clone()
                .unwrap_or_else(|| session.claims.login.clone());
            (label, Some(session.claims.login.clone()))
        }
        None => (
            nickname.unwrap_or(DEFAULT_AUTHOR).to_string(),
            None,
        ),
    }
}

fn content_type_from_extension(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
