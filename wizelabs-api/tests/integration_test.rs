//! Router tests
//!
//! Drive the full router (middleware included) as a `tower::Service`. None of
//! these requests reach PostgreSQL; see `common` for how the app is built.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use serde_json::json;
use uuid::Uuid;
use wizelabs_shared::auth::jwt::TokenType;
use wizelabs_shared::models::user::UserRole;

#[tokio::test]
async fn test_protected_route_requires_credentials() {
    let mut app = offline_app();

    let response = send(&mut app, empty_request("GET", "/v1/me", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_invalid_and_malformed_tokens() {
    let mut app = offline_app();

    let response = send(&mut app, empty_request("GET", "/v1/projects", Some("Bearer nope"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&mut app, empty_request("GET", "/v1/projects", Some("Basic abc"))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_token_is_not_a_session() {
    let mut app = offline_app();
    let caller = Caller::new(UserRole::User);
    let refresh = format!("Bearer {}", caller.token(TokenType::Refresh));

    let response = send(&mut app, empty_request("GET", "/v1/me", Some(&refresh))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_is_accepted_by_auth_layer() {
    let mut app = offline_app();
    let caller = Caller::new(UserRole::User);

    // Valid session, then a permission failure: proves the cookie authenticated
    let request = Request::builder()
        .method("POST")
        .uri("/v1/labels")
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::COOKIE,
            format!("theme=dark; wizelabs_session={}", caller.token(TokenType::Access)),
        )
        .body(Body::from(json!({"name": "AI"}).to_string()))
        .unwrap();

    let response = send(&mut app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_routes_reject_non_admins() {
    let mut app = offline_app();
    let user = Caller::new(UserRole::User).bearer();
    let status_uri = format!("/v1/applicants/{}/status", Uuid::new_v4());

    for (method, uri, body) in [
        ("POST", "/v1/labels", json!({"name": "AI"})),
        ("POST", "/v1/statuses", json!({"name": "Idea"})),
        ("POST", "/v1/tiers", json!({"name": "Tier 1"})),
        ("POST", "/v1/admins", json!({"email": "someone@wizeline.com"})),
        ("PATCH", status_uri.as_str(), json!({"status": "in_review"})),
    ] {
        let response = send(&mut app, json_request(method, uri, Some(&user), body)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
    }

    let response = send(&mut app, empty_request("GET", "/v1/applicants", Some(&user))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_applicants_cannot_use_profile_features() {
    let mut app = offline_app();
    let applicant = Caller::new(UserRole::Applicant).bearer();

    let response = send(
        &mut app,
        json_request(
            "POST",
            "/v1/projects",
            Some(&applicant),
            json!({"name": "Idea", "description": "Something"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let uri = format!("/v1/projects/{}/votes", Uuid::new_v4());
    let response = send(&mut app, empty_request("POST", &uri, Some(&applicant))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_validation_errors_are_422_with_details() {
    let mut app = offline_app();
    let admin = Caller::new(UserRole::Admin).bearer();

    let response = send(&mut app, json_request("POST", "/v1/labels", Some(&admin), json!({"name": ""}))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "name");
}

#[tokio::test]
async fn test_project_validation_runs_before_database() {
    let mut app = offline_app();
    let user = Caller::new(UserRole::User).bearer();

    let response = send(
        &mut app,
        json_request("POST", "/v1/projects", Some(&user), json!({"name": "", "description": ""})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["description", "name"]);
}

#[tokio::test]
async fn test_repo_url_is_validated() {
    let mut app = offline_app();
    let admin = Caller::new(UserRole::Admin).bearer();
    let uri = format!("/v1/projects/{}/github", Uuid::new_v4());

    let response = send(
        &mut app,
        json_request("POST", &uri, Some(&admin), json!({"repo_url": "https://github.com/acme"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "repo_url");
}

#[tokio::test]
async fn test_admin_cannot_revoke_self() {
    let mut app = offline_app();
    let admin = Caller::new(UserRole::Admin);
    let uri = format!("/v1/admins/{}", admin.user_id);

    let response = send(&mut app, empty_request("DELETE", &uri, Some(&admin.bearer()))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_profile_update_is_self_or_admin() {
    let mut app = offline_app();
    let user = Caller::new(UserRole::User).bearer();
    let uri = format!("/v1/profiles/{}", Uuid::new_v4());

    let response = send(&mut app, json_request("PATCH", &uri, Some(&user), json!({"bio": "hi"}))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_redirects_with_state_cookie() {
    let mut app = offline_app();

    let response = send(&mut app, empty_request("GET", "/auth/login", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://login.example.com/authorize?"));

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("wizelabs_oauth_state="));
    assert!(cookie.contains("HttpOnly"));

    let state = cookie
        .trim_start_matches("wizelabs_oauth_state=")
        .split(';')
        .next()
        .unwrap();
    assert!(location.contains(&format!("state={}", state)));
}

#[tokio::test]
async fn test_callback_rejects_state_mismatch() {
    let mut app = offline_app();

    let missing_cookie = empty_request("GET", "/auth/callback?code=abc&state=xyz", None);
    let response = send(&mut app, missing_cookie).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mismatch = Request::builder()
        .uri("/auth/callback?code=abc&state=xyz")
        .header(header::COOKIE, "wizelabs_oauth_state=other")
        .body(Body::empty())
        .unwrap();
    let response = send(&mut app, mismatch).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_with_provider_error() {
    let mut app = offline_app();

    let response = send(
        &mut app,
        empty_request("GET", "/auth/callback?error=access_denied", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let mut app = offline_app();
    let access = Caller::new(UserRole::User).token(TokenType::Access);

    let response = send(
        &mut app,
        json_request("POST", "/auth/refresh", None, json!({"refresh_token": access})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    let mut app = offline_app();

    let response = send(&mut app, empty_request("POST", "/auth/logout", None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("wizelabs_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_health_reports_degraded_database() {
    let mut app = offline_app();

    let response = send(&mut app, empty_request("GET", "/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}
