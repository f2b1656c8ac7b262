// src/posts/models.rs
//! Post data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full post row as stored. This is the admin projection: it includes
/// `author_login`, the GitHub login of an authenticated submitter.
///
/// Coordinates are REAL columns and deserialize straight into f64, so they
/// are numeric in every response regardless of the input encoding.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_path: Option<String>,
    pub nickname: String,
    pub author_login: Option<String>,
    pub created_at: String,
}

/// Public projection of a post. The field set is closed: columns added to the
/// table later do not leak here because listings select these columns
/// explicitly.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct PublicPost {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image_path: Option<String>,
    pub nickname: String,
    pub created_at: String,
}

/// Collected multipart fields of a submission, before coercion.
#[derive(Debug, Default)]
pub struct PostSubmission {
    pub title: String,
    pub description: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub nickname: Option<String>,
    pub image: Option<Vec<u8>>,
}
