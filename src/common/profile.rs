// src/common/profile.rs
//! Deployment profile resolved once at startup
//!
//! All environment-conditional behavior lives here: which OAuth callback URL
//! is advertised, whether session cookies get the `secure` flag, and whether
//! the org-membership gate is relaxed for local development. Handlers and
//! extractors receive the resolved profile and stay profile-agnostic.

use std::env;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct DeploymentProfile {
    /// Public hostname when serving production traffic (e.g. `board.example.net`).
    /// `None` means a local/dev deployment.
    pub public_host: Option<String>,
    /// Port the local dev server listens on; used for the local callback URL.
    pub local_port: u16,
    /// Explicit dev-only relaxation: skip the org-membership requirement on
    /// protected routes. Never honored when a public host is configured.
    pub skip_org_check: bool,
}

impl DeploymentProfile {
    pub fn from_env() -> Self {
        let public_host = env::var("PUBLIC_HOST").ok().filter(|h| !h.is_empty());

        let local_port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let bypass_requested = env::var("DEV_SKIP_ORG_CHECK")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        // The bypass is a deliberate, environment-gated relaxation for local
        // development only. A production host always wins.
        let skip_org_check = if bypass_requested && public_host.is_some() {
            warn!("DEV_SKIP_ORG_CHECK ignored: a public host is configured");
            false
        } else {
            bypass_requested
        };

        Self {
            public_host,
            local_port,
            skip_org_check,
        }
    }

    pub fn is_production(&self) -> bool {
        self.public_host.is_some()
    }

    /// OAuth callback URL advertised to the provider. Environment-selected:
    /// HTTPS on the public host in production, localhost otherwise.
    pub fn callback_url(&self) -> String {
        match &self.public_host {
            Some(host) => format!("https://{}/api/auth/github/callback", host),
            None => format!(
                "http://localhost:{}/api/auth/github/callback",
                self.local_port
            ),
        }
    }

    /// Session cookies are marked `secure` only when serving under HTTPS.
    pub fn cookie_secure(&self) -> bool {
        self.is_production()
    }
}

/// Print profile status on startup
pub fn log_profile_status(profile: &DeploymentProfile) {
    match &profile.public_host {
        Some(host) => info!(host = %host, "Production profile: secure cookies, HTTPS callback"),
        None => info!(port = profile.local_port, "Development profile: local callback"),
    }
    if profile.skip_org_check {
        warn!("⚠️  Org-membership check DISABLED (DEV_SKIP_ORG_CHECK=true) - do not use in production");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_profile() -> DeploymentProfile {
        DeploymentProfile {
            public_host: None,
            local_port: 9090,
            skip_org_check: false,
        }
    }

    #[test]
    fn test_local_callback_uses_configured_port() {
        let profile = dev_profile();
        assert_eq!(
            profile.callback_url(),
            "http://localhost:9090/api/auth/github/callback"
        );
        assert!(!profile.cookie_secure());
    }

    #[test]
    fn test_production_callback_uses_public_host() {
        let profile = DeploymentProfile {
            public_host: Some("board.example.net".to_string()),
            local_port: 9090,
            skip_org_check: false,
        };
        assert_eq!(
            profile.callback_url(),
            "https://board.example.net/api/auth/github/callback"
        );
        assert!(profile.cookie_secure());
        assert!(profile.is_production());
    }
}
