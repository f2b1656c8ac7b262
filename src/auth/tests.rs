//! Tests for auth module
//!
//! Covers the session codec (mint/verify, expiry, wrong secret), the two-tier
//! membership state machine against a mock provider, and the HTTP auth
//! surface (verify, logout, callback redirects, cookie issuance).

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use reqwest::StatusCode as ReqwestStatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::auth::github::{
        membership_from_org_list, public_status_confirms, GitHubService, Membership, OrgSummary,
    };
    use crate::auth::models::Claims;
    use crate::auth::session::SessionCodec;
    use crate::common::test_support::{
        spawn_mock_server, test_app, test_context, test_identity, TEST_ORG, TEST_SECRET,
    };

    // ------------------------------------------------------------------
    // Session codec
    // ------------------------------------------------------------------

    #[test]
    fn test_mint_and_verify_roundtrip() {
        let codec = SessionCodec::new(TEST_SECRET.to_string());
        let identity = test_identity(true);

        let token = codec.mint(&identity).expect("mint");
        let claims = codec.verify(&token).expect("verify");

        assert_eq!(claims.sub, "1234");
        assert_eq!(claims.login, "octocat");
        assert_eq!(claims.name, Some("Octo Cat".to_string()));
        assert_eq!(
            claims.avatar_url,
            Some("https://example.test/avatar.png".to_string())
        );
        assert!(claims.is_org_member);
        // Expiry is fixed at mint time: exactly 24h after issuance.
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_verify_fails_with_wrong_secret() {
        let codec = SessionCodec::new(TEST_SECRET.to_string());
        let other = SessionCodec::new("a-different-secret".to_string());

        let token = codec.mint(&test_identity(false)).expect("mint");

        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_verify_fails_after_expiry() {
        let codec = SessionCodec::new(TEST_SECRET.to_string());

        let now = Utc::now().timestamp();
        let expired = Claims {
            sub: "1234".to_string(),
            login: "octocat".to_string(),
            name: None,
            avatar_url: None,
            is_org_member: true,
            iat: now - 100_000,
            exp: now - 10,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &expired,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .expect("encode");

        assert!(codec.verify(&token).is_err());
    }

    #[test]
    fn test_verify_fails_on_malformed_token() {
        let codec = SessionCodec::new(TEST_SECRET.to_string());
        assert!(codec.verify("not-a-token").is_err());
        assert!(codec.verify("").is_err());
    }

    // ------------------------------------------------------------------
    // Membership state machine
    // ------------------------------------------------------------------

    #[test]
    fn test_public_status_confirms_only_204() {
        assert!(public_status_confirms(ReqwestStatusCode::NO_CONTENT));
        assert!(!public_status_confirms(ReqwestStatusCode::OK));
        assert!(!public_status_confirms(ReqwestStatusCode::NOT_FOUND));
        assert!(!public_status_confirms(ReqwestStatusCode::FOUND));
    }

    #[test]
    fn test_membership_from_org_list() {
        let orgs = vec![
            OrgSummary {
                login: "SomeOtherOrg".to_string(),
            },
            OrgSummary {
                login: TEST_ORG.to_string(),
            },
        ];
        assert_eq!(
            membership_from_org_list(&orgs, TEST_ORG),
            Membership::Listed
        );
        assert_eq!(
            membership_from_org_list(&orgs[..1], TEST_ORG),
            Membership::Unconfirmed
        );
        assert_eq!(
            membership_from_org_list(&[], TEST_ORG),
            Membership::Unconfirmed
        );
    }

    fn github_with_base(base: &str) -> GitHubService {
        GitHubService::with_bases(
            Some("client-id".to_string()),
            Some("client-secret".to_string()),
            TEST_ORG.to_string(),
            base.to_string(),
            base.to_string(),
        )
    }

    #[tokio::test]
    async fn test_tier1_confirmation_skips_tier2() {
        let tier2_hits = Arc::new(AtomicUsize::new(0));
        let hits = tier2_hits.clone();

        let provider = Router::new()
            .route(
                "/orgs/:org/public_members/:login",
                get(|| async { StatusCode::NO_CONTENT }),
            )
            .route(
                "/user/orgs",
                get(move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Json(json!([]))
                    }
                }),
            );

        let base = spawn_mock_server(provider).await;
        let github = github_with_base(&base);

        let membership = github.resolve_membership("token", "octocat").await;

        assert_eq!(membership, Membership::PublicMember);
        assert!(membership.is_member());
        assert_eq!(tier2_hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tier2_confirms_when_tier1_is_404() {
        let provider = Router::new()
            .route(
                "/orgs/:org/public_members/:login",
                get(|| async { StatusCode::NOT_FOUND }),
            )
            .route(
                "/user/orgs",
                get(|| async { Json(json!([{ "login": "Krz-Tech" }])) }),
            );

        let base = spawn_mock_server(provider).await;
        let github = github_with_base(&base);

        let membership = github.resolve_membership("token", "octocat").await;

        assert_eq!(membership, Membership::Listed);
        assert!(membership.is_member());
    }

    #[tokio::test]
    async fn test_both_tiers_unconfirmed_is_not_member() {
        let provider = Router::new()
            .route(
                "/orgs/:org/public_members/:login",
                get(|| async { StatusCode::NOT_FOUND }),
            )
            .route(
                "/user/orgs",
                get(|| async { Json(json!([{ "login": "UnrelatedOrg" }])) }),
            );

        let base = spawn_mock_server(provider).await;
        let github = github_with_base(&base);

        let membership = github.resolve_membership("token", "octocat").await;

        assert_eq!(membership, Membership::Unconfirmed);
        assert!(!membership.is_member());
    }

    #[tokio::test]
    async fn test_tier2_failure_degrades_to_inconclusive() {
        let provider = Router::new()
            .route(
                "/orgs/:org/public_members/:login",
                get(|| async { StatusCode::NOT_FOUND }),
            )
            .route(
                "/user/orgs",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            );

        let base = spawn_mock_server(provider).await;
        let github = github_with_base(&base);

        let membership = github.resolve_membership("token", "octocat").await;

        // The explicit inconclusive branch: resolution never errors, it
        // resolves to not-a-member.
        assert_eq!(membership, Membership::Inconclusive);
        assert!(!membership.is_member());
    }

    #[test]
    fn test_authorize_url_encodes_params() {
        let github = GitHubService::new(
            Some("client123".to_string()),
            Some("secret".to_string()),
            TEST_ORG.to_string(),
        );

        let url = github
            .authorize_url("http://localhost:8080/api/auth/github/callback")
            .expect("authorize url");

        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=client123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080"));
        assert!(url.contains("scope=user%3Aemail"));
    }

    // ------------------------------------------------------------------
    // HTTP surface
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_verify_requires_cookie() {
        let ctx = test_context().await;
        let app = test_app(ctx.state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/verify")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_verify_returns_session_claims() {
        let ctx = test_context().await;
        let token = ctx.state.codec.mint(&test_identity(true)).unwrap();
        let app = test_app(ctx.state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/verify")
                    .header(header::COOKIE, format!("admin_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["user"]["login"], "octocat");
        assert_eq!(json["user"]["is_org_member"], true);
    }

    #[tokio::test]
    async fn test_verify_rejects_tampered_cookie() {
        let ctx = test_context().await;
        let app = test_app(ctx.state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/verify")
                    .header(header::COOKIE, "admin_token=tampered.token.value")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let ctx = test_context().await;
        let app = test_app(ctx.state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(set_cookie.starts_with("admin_token="));
        assert!(set_cookie.contains("Max-Age=0"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_callback_without_code_redirects_auth_failed() {
        let ctx = test_context().await;
        let app = test_app(ctx.state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/github/callback")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin?error=auth_failed"
        );
    }

    #[tokio::test]
    async fn test_callback_with_empty_token_redirects_token_failed() {
        let provider = Router::new().route(
            "/login/oauth/access_token",
            post(|| async { Json(json!({})) }),
        );
        let base = spawn_mock_server(provider).await;

        let ctx =
            crate::common::test_support::test_context_with(Some(github_with_base(&base)), false)
                .await;
        let app = test_app(ctx.state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/github/callback?code=abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin?error=token_failed"
        );
    }

    #[tokio::test]
    async fn test_callback_full_flow_sets_member_cookie() {
        let provider = Router::new()
            .route(
                "/login/oauth/access_token",
                post(|| async { Json(json!({ "access_token": "provider-token" })) }),
            )
            .route(
                "/user",
                get(|| async {
                    Json(json!({
                        "id": 99,
                        "login": "octocat",
                        "name": "Octo Cat",
                        "avatar_url": null,
                    }))
                }),
            )
            .route(
                "/orgs/:org/public_members/:login",
                get(|| async { StatusCode::NO_CONTENT }),
            );
        let base = spawn_mock_server(provider).await;

        let ctx =
            crate::common::test_support::test_context_with(Some(github_with_base(&base)), false)
                .await;
        let app = test_app(ctx.state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/github/callback?code=abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin"
        );

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("session cookie set")
            .to_string();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
        // Production profile in the fixture, so the cookie is secure.
        assert!(set_cookie.contains("Secure"));

        let token = set_cookie
            .strip_prefix("admin_token=")
            .and_then(|rest| rest.split(';').next())
            .expect("token value");
        let claims = ctx.state.codec.verify(token).expect("minted claims verify");
        assert_eq!(claims.sub, "99");
        assert_eq!(claims.login, "octocat");
        assert!(claims.is_org_member);
    }

    /// Login still succeeds when membership resolution is fully inconclusive:
    /// a session cookie is issued, just with membership false.
    #[tokio::test]
    async fn test_callback_succeeds_with_inconclusive_membership() {
        let provider = Router::new()
            .route(
                "/login/oauth/access_token",
                post(|| async { Json(json!({ "access_token": "provider-token" })) }),
            )
            .route(
                "/user",
                get(|| async {
                    Json(json!({
                        "id": 7,
                        "login": "drifter",
                        "name": null,
                        "avatar_url": null,
                    }))
                }),
            )
            .route(
                "/orgs/:org/public_members/:login",
                get(|| async { StatusCode::NOT_FOUND }),
            )
            .route(
                "/user/orgs",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            );
        let base = spawn_mock_server(provider).await;

        let ctx =
            crate::common::test_support::test_context_with(Some(github_with_base(&base)), false)
                .await;
        let app = test_app(ctx.state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/github/callback?code=abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin"
        );

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("session cookie set");
        let token = set_cookie
            .strip_prefix("admin_token=")
            .and_then(|rest| rest.split(';').next())
            .expect("token value");
        let claims = ctx.state.codec.verify(token).expect("claims verify");
        assert!(!claims.is_org_member);
    }
}
