//! Authentication data models

use serde::{Deserialize, Serialize};

/// JWT claims carried by the `admin_token` cookie.
///
/// `is_org_member` is a separate claim from the identity fields so a later
/// re-architecture can re-resolve membership per request without changing the
/// token shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_org_member: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Identity derived per login from the provider profile plus the resolved
/// membership flag. Never persisted; embedded into session claims.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_org_member: bool,
}

/// Query parameters on the OAuth callback
#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}
