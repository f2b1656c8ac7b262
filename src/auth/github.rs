// src/auth/github.rs
//! GitHub identity resolution
//!
//! Exchanges an OAuth authorization code for an access token, fetches the
//! user profile, and resolves organization membership with a two-tier check.
//! Membership resolution is best-effort: transport failures degrade to
//! "not a member" and never abort the login.

use reqwest::{header, Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const GITHUB_OAUTH_BASE: &str = "https://github.com";
const GITHUB_API_BASE: &str = "https://api.github.com";
const OAUTH_SCOPE: &str = "user:email";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub OAuth is not configured")]
    NotConfigured,

    #[error("invalid OAuth configuration: {0}")]
    InvalidConfig(String),

    #[error("token exchange returned no access token")]
    TokenExchange,

    #[error("failed to fetch GitHub user profile: {0}")]
    ProfileFetch(String),

    #[error("HTTP request failed: {0}")]
    Request(String),
}

/// Terminal states of the membership state machine.
///
/// `Inconclusive` is the explicit "a tier could not be consulted" branch; it
/// resolves to not-a-member by policy rather than by a swallowed exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Tier 1 confirmed: the public-members endpoint answered 204.
    PublicMember,
    /// Tier 2 confirmed: the org appeared in the caller's own org list.
    Listed,
    /// Both tiers answered and neither confirmed membership.
    Unconfirmed,
    /// A tier failed (network/auth error); treated as not a member.
    Inconclusive,
}

impl Membership {
    pub fn is_member(self) -> bool {
        matches!(self, Membership::PublicMember | Membership::Listed)
    }
}

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub id: i64,
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrgSummary {
    pub login: String,
}

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    access_token: Option<String>,
}

pub struct GitHubService {
    client: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    org: String,
    oauth_base: String,
    api_base: String,
}

impl GitHubService {
    pub fn new(client_id: Option<String>, client_secret: Option<String>, org: String) -> Self {
        Self::with_bases(
            client_id,
            client_secret,
            org,
            GITHUB_OAUTH_BASE.to_string(),
            GITHUB_API_BASE.to_string(),
        )
    }

    /// Base URLs are overridable so tests can point the resolver at a local
    /// mock provider.
    pub fn with_bases(
        client_id: Option<String>,
        client_secret: Option<String>,
        org: String,
        oauth_base: String,
        api_base: String,
    ) -> Self {
        let client = Client::builder()
            .user_agent("geoboard")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            client_id,
            client_secret,
            org,
            oauth_base,
            api_base,
        }
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    fn credentials(&self) -> Result<(&str, &str), GitHubError> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(GitHubError::NotConfigured),
        }
    }

    /// Provider authorize URL with client id, callback, and scope.
    pub fn authorize_url(&self, redirect_uri: &str) -> Result<String, GitHubError> {
        let (client_id, _) = self.credentials()?;

        let url = Url::parse_with_params(
            &format!("{}/login/oauth/authorize", self.oauth_base),
            &[
                ("client_id", client_id),
                ("redirect_uri", redirect_uri),
                ("scope", OAUTH_SCOPE),
            ],
        )
        .map_err(|e| GitHubError::InvalidConfig(e.to_string()))?;

        Ok(url.into())
    }

    /// POST the authorization code to the token endpoint. A response without
    /// an access token is a terminal token-exchange failure.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String, GitHubError> {
        let (client_id, client_secret) = self.credentials()?;

        let response = self
            .client
            .post(format!("{}/login/oauth/access_token", self.oauth_base))
            .header(header::ACCEPT, "application/json")
            .json(&ExchangeRequest {
                client_id,
                client_secret,
                code,
                redirect_uri,
            })
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        let body: ExchangeResponse = response
            .json()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        match body.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(GitHubError::TokenExchange),
        }
    }

    /// GET the user profile. Any non-2xx status is a terminal failure.
    pub async fn fetch_user(&self, access_token: &str) -> Result<GitHubUser, GitHubError> {
        let response = self
            .client
            .get(format!("{}/user", self.api_base))
            .header(header::AUTHORIZATION, format!("token {}", access_token))
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GitHubError::ProfileFetch(response.status().to_string()));
        }

        response
            .json::<GitHubUser>()
            .await
            .map_err(|e| GitHubError::ProfileFetch(e.to_string()))
    }

    /// Two-tier membership resolution. Infallible by design: every failure
    /// path lands on a terminal `Membership` state.
    pub async fn resolve_membership(&self, access_token: &str, login: &str) -> Membership {
        // Tier 1: public membership. Confirmed iff the status is exactly 204;
        // any other status (404 included) just falls through to tier 2.
        match self.public_membership_status(access_token, login).await {
            Ok(status) if public_status_confirms(status) => {
                debug!(login = %login, org = %self.org, "Public org membership confirmed");
                return Membership::PublicMember;
            }
            Ok(status) => {
                debug!(
                    login = %login,
                    org = %self.org,
                    http_status = %status,
                    "Not a public org member, consulting user org list"
                );
            }
            Err(e) => {
                warn!(error = %e, "Public membership check failed, consulting user org list");
            }
        }

        // Tier 2: the caller's own organization list.
        match self.list_user_orgs(access_token).await {
            Ok(orgs) => membership_from_org_list(&orgs, &self.org),
            Err(e) => {
                warn!(error = %e, "User org list check failed, treating as non-member");
                Membership::Inconclusive
            }
        }
    }

    async fn public_membership_status(
        &self,
        access_token: &str,
        login: &str,
    ) -> Result<StatusCode, GitHubError> {
        let response = self
            .client
            .get(format!(
                "{}/orgs/{}/public_members/{}",
                self.api_base, self.org, login
            ))
            .header(header::AUTHORIZATION, format!("token {}", access_token))
            .header(header::ACCEPT, "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        Ok(response.status())
    }

    async fn list_user_orgs(&self, access_token: &str) -> Result<Vec<OrgSummary>, GitHubError> {
        let response = self
            .client
            .get(format!("{}/user/orgs", self.api_base))
            .header(header::AUTHORIZATION, format!("token {}", access_token))
            .header(header::ACCEPT, "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GitHubError::Request(response.status().to_string()));
        }

        response
            .json::<Vec<OrgSummary>>()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))
    }
}

/// Tier 1 confirms membership iff the response is exactly 204 No Content.
pub(crate) fn public_status_confirms(status: StatusCode) -> bool {
    status == StatusCode::NO_CONTENT
}

/// Tier 2 confirms membership iff the target org appears in the caller's list.
pub(crate) fn membership_from_org_list(orgs: &[OrgSummary], target: &str) -> Membership {
    if orgs.iter().any(|org| org.login == target) {
        Membership::Listed
    } else {
        Membership::Unconfirmed
    }
}
