mod common;

use axum::http::{Method, StatusCode};
use common::{session_from, TestApp};
use serde_json::json;

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_login_and_rotate_refresh_tokens() {
    let app = TestApp::new();
    let email = "ana@example.com";

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": "correct horse",
                "first_name": "Ana",
                "last_name": "Lopez",
                "role": "candidate"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["user"]["role"], "candidate");
    assert!(body["data"]["user"].get("password_hash").is_none());

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let session = session_from(&body);

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refresh_token": session.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let rotated = session_from(&body);
    assert_ne!(rotated.refresh_token, session.refresh_token);

    // The previous refresh token was revoked by the rotation.
    let (status, body) = app
        .request(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refresh_token": session.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/logout",
            None,
            Some(json!({ "refresh_token": rotated.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refresh_token": rotated.refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/auth/me", &rotated.access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], email);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = TestApp::new();
    let payload = json!({
        "email": "dup@example.com",
        "password": "long enough",
        "first_name": "Dup",
        "last_name": "User",
        "role": "recruiter",
        "company": "Acme"
    });
    let (status, _) = app
        .request(Method::POST, "/auth/register", None, Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .request(Method::POST, "/auth/register", None, Some(payload))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn invalid_registrations_are_refused() {
    let app = TestApp::new();
    let cases = [
        json!({ "email": "not-an-email", "password": "long enough", "first_name": "A", "last_name": "B", "role": "candidate" }),
        json!({ "email": "short@example.com", "password": "short", "first_name": "A", "last_name": "B", "role": "candidate" }),
        json!({ "email": "boss@example.com", "password": "long enough", "first_name": "A", "last_name": "B", "role": "admin" }),
        json!({ "email": "odd@example.com", "password": "long enough", "first_name": "A", "last_name": "B", "role": "wizard" }),
    ];
    for payload in cases {
        let (status, body) = app
            .request(Method::POST, "/auth/register", None, Some(payload.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload} -> {body}");
    }
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    let session = app.register("candidate").await;
    let (_, me) = app.get("/auth/me", &session.access_token).await;
    let email = me["data"]["email"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": "definitely wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn protected_routes_need_a_valid_bearer_token() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app.get("/auth/me", "garbage.token.value").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_normalizes_skills() {
    let app = TestApp::new();
    let session = app.register("candidate").await;
    let (status, body) = app
        .put(
            "/auth/me",
            &session.access_token,
            json!({ "headline": "Backend developer", "skills": [" Rust ", "rust", "", "SQL"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["headline"], "Backend developer");
    assert_eq!(body["data"]["skills"], json!(["Rust", "SQL"]));
}

#[tokio::test]
async fn public_surface_is_rate_limited() {
    let mut config = common::test_config();
    config.public_rps = 2;
    let app = TestApp::with_config(config);

    for _ in 0..2 {
        let (status, _) = app.request(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limit_exceeded");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();
    let (status, body) = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/matches/swipe"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}
