//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - GitHub OAuth login and callback
//! - Two-tier organization-membership resolution
//! - JWT session minting and verification (cookie-borne)
//! - SessionUser / OrgMember extractors for protected routes

pub mod extractors;
pub mod github;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;

#[cfg(test)]
mod tests;

pub use extractors::{OrgMember, SessionUser};
pub use models::{Claims, Identity};
pub use routes::auth_routes;
pub use session::SessionCodec;
