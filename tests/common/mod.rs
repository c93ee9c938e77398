#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use hereoz_backend::{
    config::{Config, LogFormat, StorageBackend},
    database::Repositories,
    routes, AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

pub fn test_config() -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        storage_backend: StorageBackend::Memory,
        database_url: None,
        database_max_connections: 1,
        jwt_secret: "test_secret_key".to_string(),
        access_token_ttl_minutes: 15,
        refresh_token_ttl_days: 30,
        public_rps: 10_000,
        api_rps: 10_000,
        notification_webhook_url: None,
        notification_webhook_secret: None,
        log_format: LogFormat::Text,
    }
}

pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let state = AppState::new(config, Repositories::memory()).expect("app state");
        Self {
            router: routes::router(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, JsonValue) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: JsonValue) -> (StatusCode, JsonValue) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: JsonValue) -> (StatusCode, JsonValue) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn register(&self, role: &str) -> Session {
        let email = format!("{role}-{}@example.com", Uuid::new_v4());
        let company = (role == "recruiter").then_some("Acme");
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "s3cure-passw0rd",
                    "first_name": "Test",
                    "last_name": role,
                    "role": role,
                    "company": company,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {role}: {body}");
        session_from(&body)
    }

    pub async fn candidate_with_skills(&self, skills: &[&str]) -> Session {
        let session = self.register("candidate").await;
        let (status, body) = self
            .put("/auth/me", &session.access_token, json!({ "skills": skills }))
            .await;
        assert_eq!(status, StatusCode::OK, "profile update: {body}");
        session
    }

    pub async fn create_offer(&self, recruiter: &Session, skills: &[&str], status: &str) -> Uuid {
        let (code, body) = self
            .post(
                "/jobs",
                &recruiter.access_token,
                json!({
                    "title": "Backend engineer",
                    "company": "Acme",
                    "location": "Paris",
                    "contract_type": "CDI",
                    "salary_min": 45000,
                    "salary_max": 60000,
                    "currency": "eur",
                    "description": "Build and run the matching APIs.",
                    "skills": skills,
                    "remote": true,
                    "status": status,
                }),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "create offer: {body}");
        id_of(&body["data"])
    }

    /// Candidate right-swipes a fresh published offer; returns the application id.
    pub async fn apply(&self, candidate: &Session, offer_id: Uuid) -> Uuid {
        let (status, body) = self
            .post(
                "/matches/swipe",
                &candidate.access_token,
                json!({ "offer_id": offer_id, "action": "right" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "swipe: {body}");
        id_of(&body["data"]["application"])
    }

    pub async fn set_status(
        &self,
        recruiter: &Session,
        application_id: Uuid,
        body: JsonValue,
    ) -> (StatusCode, JsonValue) {
        self.put(
            &format!("/applications/{application_id}/status"),
            &recruiter.access_token,
            body,
        )
        .await
    }
}

pub fn session_from(body: &JsonValue) -> Session {
    Session {
        user_id: id_of(&body["data"]["user"]),
        access_token: body["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string(),
        refresh_token: body["data"]["refresh_token"]
            .as_str()
            .expect("refresh token")
            .to_string(),
    }
}

pub fn id_of(value: &JsonValue) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .unwrap_or_else(|| panic!("no id in {value}"))
}
