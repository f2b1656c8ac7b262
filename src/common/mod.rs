// Common module - shared types and utilities across all modules

pub mod error;
pub mod migrations;
pub mod profile;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use profile::DeploymentProfile;
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
