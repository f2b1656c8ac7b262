// src/auth/session.rs
//! Session token codec
//!
//! Mints and verifies the signed, time-bounded session token. The signing
//! secret is an injected dependency so tests can supply a fixed secret and
//! assert deterministic verification.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::env;
use thiserror::Error;
use tracing::debug;

use super::models::{Claims, Identity};

/// Session lifetime, fixed at mint time.
const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session signing secret is not configured")]
    MissingSecret,

    #[error("failed to sign session token")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("invalid or expired session token")]
    Invalid,
}

/// Codec over the process-wide signing secret. Pure: no I/O beyond the
/// injected secret, safe to share across concurrent request handlers.
#[derive(Clone)]
pub struct SessionCodec {
    secret: String,
}

impl SessionCodec {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Read the secret from `JWT_SECRET`. Missing or empty is a fatal
    /// configuration error; there is no insecure fallback.
    pub fn from_env() -> Result<Self, SessionError> {
        match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => Ok(Self::new(secret)),
            _ => Err(SessionError::MissingSecret),
        }
    }

    /// Serialize the identity into claims with `exp = iat + 24h` and sign.
    pub fn mint(&self, identity: &Identity) -> Result<String, SessionError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: identity.id.clone(),
            login: identity.login.clone(),
            name: identity.name.clone(),
            avatar_url: identity.avatar_url.clone(),
            is_org_member: identity.is_org_member,
            iat,
            exp: iat + SESSION_TTL_SECS,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(SessionError::Encode)
    }

    /// Check signature and expiry. All-or-nothing: a bad signature, malformed
    /// payload, or `exp <= now` all fail closed as `Invalid`.
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Session token verification failed");
            SessionError::Invalid
        })
    }
}
