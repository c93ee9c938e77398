mod common;

use axum::http::{Method, StatusCode};
use common::{Session, TestApp};
use serde_json::json;
use uuid::Uuid;

struct Pipeline {
    app: TestApp,
    recruiter: Session,
    candidate: Session,
    application_id: Uuid,
}

async fn pipeline() -> Pipeline {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let candidate = app.register("candidate").await;
    let offer_id = app.create_offer(&recruiter, &["Rust"], "published").await;
    let application_id = app.apply(&candidate, offer_id).await;
    Pipeline {
        app,
        recruiter,
        candidate,
        application_id,
    }
}

impl Pipeline {
    fn uri(&self, suffix: &str) -> String {
        format!("/applications/{}{suffix}", self.application_id)
    }
}

#[tokio::test]
async fn rejection_reason_is_stored_and_visible_to_the_candidate() {
    let p = pipeline().await;
    let (status, body) = p
        .app
        .set_status(
            &p.recruiter,
            p.application_id,
            json!({ "status": "rejected", "reject_reason": "Profile does not match" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "rejected");

    let (status, body) = p.app.get(&p.uri(""), &p.candidate.access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reject_reason"], "Profile does not match");
    assert_eq!(body["data"]["step_index"], -1);
    assert_eq!(body["data"]["can_withdraw"], false);
}

#[tokio::test]
async fn terminal_applications_refuse_further_moves() {
    let p = pipeline().await;
    let (status, _) = p
        .app
        .set_status(&p.recruiter, p.application_id, json!({ "status": "hired" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    for next in ["rejected", "offer", "accepted"] {
        let (status, body) = p
            .app
            .set_status(&p.recruiter, p.application_id, json!({ "status": next }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT, "hired -> {next}: {body}");
    }
}

#[tokio::test]
async fn pipeline_only_moves_forward() {
    let p = pipeline().await;
    let (status, body) = p
        .app
        .set_status(&p.recruiter, p.application_id, json!({ "status": "interview" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["step_index"], 2);

    for next in ["viewed", "interview", "new"] {
        let (status, _) = p
            .app
            .set_status(&p.recruiter, p.application_id, json!({ "status": next }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT, "interview -> {next}");
    }

    let (status, body) = p
        .app
        .set_status(&p.recruiter, p.application_id, json!({ "status": "offer" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "offer");
}

#[tokio::test]
async fn unknown_status_is_a_bad_request() {
    let p = pipeline().await;
    let (status, _) = p
        .app
        .set_status(&p.recruiter, p.application_id, json!({ "status": "archived" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stale_expected_version_conflicts() {
    let p = pipeline().await;
    let (_, body) = p.app.get(&p.uri(""), &p.recruiter.access_token).await;
    let version = body["data"]["version"].as_i64().unwrap();

    let (status, body) = p
        .app
        .set_status(
            &p.recruiter,
            p.application_id,
            json!({ "status": "contacted", "expected_version": version }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["version"], version + 1);

    let (status, body) = p
        .app
        .set_status(
            &p.recruiter,
            p.application_id,
            json!({ "status": "rejected", "expected_version": version }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (_, body) = p.app.get(&p.uri(""), &p.recruiter.access_token).await;
    assert_eq!(body["data"]["status"], "contacted");
}

#[tokio::test]
async fn viewed_marker_only_applies_to_new_applications() {
    let p = pipeline().await;
    let (status, body) = p
        .app
        .request(
            Method::POST,
            &p.uri("/viewed"),
            Some(&p.recruiter.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "viewed");
    assert_eq!(body["data"]["step_index"], 1);

    let (status, _) = p
        .app
        .request(
            Method::POST,
            &p.uri("/viewed"),
            Some(&p.recruiter.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn candidate_withdraws_with_default_reason() {
    let p = pipeline().await;
    let (status, body) = p
        .app
        .request(
            Method::POST,
            &p.uri("/withdraw"),
            Some(&p.candidate.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["reject_reason"], "Withdrawn by candidate");
    assert!(body["data"]["withdrawn_at"].is_string());
    assert_eq!(body["data"]["can_withdraw"], false);

    let (status, _) = p
        .app
        .post(&p.uri("/withdraw"), &p.candidate.access_token, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn withdraw_keeps_a_given_reason() {
    let p = pipeline().await;
    let (status, body) = p
        .app
        .post(
            &p.uri("/withdraw"),
            &p.candidate.access_token,
            json!({ "reason": "Accepted another offer" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["reject_reason"], "Accepted another offer");
}

#[tokio::test]
async fn roles_and_ownership_are_enforced() {
    let p = pipeline().await;
    let stranger = p.app.register("recruiter").await;
    let other_candidate = p.app.register("candidate").await;

    let (status, _) = p
        .app
        .set_status(&p.candidate, p.application_id, json!({ "status": "viewed" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = p
        .app
        .set_status(&stranger, p.application_id, json!({ "status": "viewed" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = p.app.get(&p.uri(""), &other_candidate.access_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = p
        .app
        .request(
            Method::POST,
            &p.uri("/withdraw"),
            Some(&p.recruiter.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = p
        .app
        .get(&format!("/applications/{}", Uuid::new_v4()), &p.recruiter.access_token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notes_and_status_changes_are_audited() {
    let p = pipeline().await;
    let (status, body) = p
        .app
        .put(
            &p.uri("/notes"),
            &p.recruiter.access_token,
            json!({ "notes": "Strong Rust background" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["notes"], "Strong Rust background");

    p.app
        .set_status(&p.recruiter, p.application_id, json!({ "status": "contacted" }))
        .await;

    let (status, body) = p.app.get(&p.uri("/history"), &p.recruiter.access_token).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let actions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["action"].as_str())
        .collect();
    assert!(actions.contains(&"application.notes_updated"), "{actions:?}");
    assert!(actions.contains(&"application.status_changed"), "{actions:?}");

    let change = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["action"] == "application.status_changed")
        .unwrap();
    assert_eq!(change["changes"]["from"], "new");
    assert_eq!(change["changes"]["to"], "contacted");
}

#[tokio::test]
async fn listing_filters_by_status() {
    let p = pipeline().await;
    let (_, body) = p
        .app
        .get("/applications?status=new", &p.recruiter.access_token)
        .await;
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = p
        .app
        .get("/applications?status=rejected", &p.recruiter.access_token)
        .await;
    assert_eq!(body["pagination"]["total"], 0);
}
