// src/posts/validators.rs

use super::models::PostSubmission;
use crate::common::{ValidationResult, Validator};

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

// ============================================================================
// Post Validators
// ============================================================================

pub struct PostValidator;

impl Validator<PostSubmission> for PostValidator {
    fn validate(&self, data: &PostSubmission) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.trim().is_empty() {
            result.add_error("title", "Title is required");
        } else if data.title.len() > 255 {
            result.add_error("title", "Title must be less than 255 characters");
        }

        if data.description.len() > 10000 {
            result.add_error(
                "description",
                "Description must be less than 10000 characters",
            );
        }

        if let Some(nickname) = &data.nickname {
            if nickname.len() > 100 {
                result.add_error("nickname", "Nickname must be less than 100 characters");
            }
        }

        result
    }
}

/// Coerce a raw coordinate field to a finite float within range.
///
/// `None` covers every rejection: a missing field, a non-numeric string,
/// NaN/infinity, and out-of-range values.
pub fn parse_coordinate(raw: Option<&str>, range: (f64, f64)) -> Option<f64> {
    let value = raw?.trim().parse::<f64>().ok()?;

    if !value.is_finite() {
        return None;
    }

    if value < range.0 || value > range.1 {
        return None;
    }

    Some(value)
}
