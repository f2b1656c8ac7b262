// src/services/images.rs
//! Image store and normalization
//!
//! Uploaded images are decoded, resized to fit within an 800x600 bounding box
//! (aspect ratio preserved, never upscaled), re-encoded as quality-80 JPEG,
//! and written under a collision-resistant generated name. Filenames combine
//! a millisecond timestamp with a v4 UUID, so concurrent writers need no
//! mutual exclusion.

use chrono::Utc;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const MAX_WIDTH: u32 = 800;
const MAX_HEIGHT: u32 = 600;
const JPEG_QUALITY: u8 = 80;

/// URL prefix under which stored images are served.
pub const IMAGE_URL_PREFIX: &str = "uploads/images";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported media type")]
    UnsupportedMediaType,

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("failed to write image file: {0}")]
    Write(String),
}

#[derive(Clone)]
pub struct ImageService {
    dir: PathBuf,
}

impl ImageService {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Idempotent; called once at startup.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Decode, fit within the bounding box, and re-encode as JPEG.
    ///
    /// Pure over the input bytes; the caller decides whether the result gets
    /// written, so coordinate validation can reject a submission before any
    /// file exists.
    pub fn normalize(data: &[u8]) -> Result<Vec<u8>, ImageError> {
        if !is_image_bytes(data) {
            return Err(ImageError::UnsupportedMediaType);
        }

        let img =
            image::load_from_memory(data).map_err(|e| ImageError::Decode(e.to_string()))?;

        let img = if img.width() > MAX_WIDTH || img.height() > MAX_HEIGHT {
            img.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Triangle)
        } else {
            // Smaller originals are re-encoded as-is, never upscaled.
            img
        };

        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

        let mut out = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
        rgb.write_with_encoder(encoder)
            .map_err(|e| ImageError::Encode(e.to_string()))?;

        Ok(out.into_inner())
    }

    /// Normalize and persist, returning the relative storage path that goes
    /// into the post row.
    pub async fn store(&self, data: &[u8]) -> Result<String, ImageError> {
        let normalized = Self::normalize(data)?;

        let filename = generate_filename();
        let full_path = self.dir.join(&filename);

        tokio::fs::write(&full_path, &normalized)
            .await
            .map_err(|e| ImageError::Write(e.to_string()))?;

        debug!(path = %full_path.display(), "Stored normalized image");

        Ok(format!("{}/{}", IMAGE_URL_PREFIX, filename))
    }

    /// Filesystem path for a stored image filename.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Timestamp + random unique suffix, collision-resistant between writers.
fn generate_filename() -> String {
    format!("{}_{}.jpg", Utc::now().timestamp_millis(), Uuid::new_v4())
}

fn is_image_bytes(data: &[u8]) -> bool {
    let infer = infer::Infer::new();
    if let Some(info) = infer.get(data) {
        matches!(
            info.mime_type(),
            "image/png" | "image/jpeg" | "image/gif" | "image/webp"
        )
    } else {
        false
    }
}
