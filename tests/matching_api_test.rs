mod common;

use axum::http::StatusCode;
use common::{id_of, TestApp};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn right_swipe_opens_an_application() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let candidate = app.candidate_with_skills(&["rust", "sql"]).await;
    let offer_id = app.create_offer(&recruiter, &["Rust", "Go"], "published").await;

    let (status, body) = app
        .post(
            "/matches/swipe",
            &candidate.access_token,
            json!({ "offer_id": offer_id, "action": "right" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["swipe"]["action"], "right");
    assert_eq!(body["data"]["swipe"]["matching_score"], 50.0);
    assert_eq!(body["data"]["application"]["status"], "new");
    let application_id = id_of(&body["data"]["application"]);

    let (status, body) = app
        .get(&format!("/applications/{application_id}"), &candidate.access_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["candidate_id"], candidate.user_id.to_string());
    assert_eq!(body["data"]["offer_id"], offer_id.to_string());
    assert_eq!(body["data"]["step_index"], 0);
    assert_eq!(body["data"]["can_withdraw"], true);

    let (_, body) = app.get("/applications", &recruiter.access_token).await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn second_swipe_on_the_same_offer_conflicts() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let candidate = app.register("candidate").await;
    let offer_id = app.create_offer(&recruiter, &[], "published").await;
    app.apply(&candidate, offer_id).await;

    for action in ["right", "left", "favorite"] {
        let (status, body) = app
            .post(
                "/matches/swipe",
                &candidate.access_token,
                json!({ "offer_id": offer_id, "action": action }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT, "{action}: {body}");
    }

    let (_, body) = app.get("/applications", &candidate.access_token).await;
    assert_eq!(body["pagination"]["total"], 1);
    let (_, body) = app.get("/matches/history", &candidate.access_token).await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn left_and_favorite_swipes_do_not_apply() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let candidate = app.register("candidate").await;
    let passed = app.create_offer(&recruiter, &[], "published").await;
    let liked = app.create_offer(&recruiter, &[], "published").await;

    let (status, body) = app
        .post(
            "/matches/swipe",
            &candidate.access_token,
            json!({ "offer_id": passed, "action": "gauche", "rejection_reason": "Too far" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["swipe"]["action"], "left");
    assert_eq!(body["data"]["swipe"]["rejection_reason"], "Too far");
    assert!(body["data"]["application"].is_null());

    let (status, body) = app
        .post(
            "/matches/swipe",
            &candidate.access_token,
            json!({ "offer_id": liked, "action": "favorite", "rejection_reason": "ignored" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"]["swipe"]["rejection_reason"].is_null());

    let (_, body) = app.get("/applications", &candidate.access_token).await;
    assert_eq!(body["pagination"]["total"], 0);

    let (status, body) = app.get("/matches/favorites", &candidate.access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], liked.to_string());

    let (_, body) = app
        .get("/matches/history?action=left", &candidate.access_token)
        .await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["offer_id"], passed.to_string());
}

#[tokio::test]
async fn malformed_swipes_are_bad_requests() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let candidate = app.register("candidate").await;
    let offer_id = app.create_offer(&recruiter, &[], "published").await;

    let cases = [
        json!({ "offer_id": offer_id, "action": "superlike" }),
        json!({ "offer_id": offer_id, "action": "right", "matching_score": 150.0 }),
        json!({ "offer_id": offer_id, "action": "right", "matching_score": -3.0 }),
        json!({ "offer_id": "not-a-uuid", "action": "right" }),
        json!({ "action": "right" }),
    ];
    for payload in cases {
        let (status, body) = app
            .post("/matches/swipe", &candidate.access_token, payload.clone())
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload} -> {body}");
    }

    // Nothing was written by the refused attempts.
    app.apply(&candidate, offer_id).await;
}

#[tokio::test]
async fn only_published_offers_can_be_swiped() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let candidate = app.register("candidate").await;
    let draft = app.create_offer(&recruiter, &[], "draft").await;

    let (status, _) = app
        .post(
            "/matches/swipe",
            &candidate.access_token,
            json!({ "offer_id": draft, "action": "right" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/matches/swipe",
            &candidate.access_token,
            json!({ "offer_id": Uuid::new_v4(), "action": "right" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recruiters_cannot_swipe() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let offer_id = app.create_offer(&recruiter, &[], "published").await;

    let (status, body) = app
        .post(
            "/matches/swipe",
            &recruiter.access_token,
            json!({ "offer_id": offer_id, "action": "right" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn client_supplied_score_is_kept() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let candidate = app.register("candidate").await;
    let offer_id = app.create_offer(&recruiter, &["Rust"], "published").await;

    let (status, body) = app
        .post(
            "/matches/swipe",
            &candidate.access_token,
            json!({ "offer_id": offer_id, "action": "droite", "matching_score": 87.5 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["swipe"]["action"], "right");
    assert_eq!(body["data"]["swipe"]["matching_score"], 87.5);
}

#[tokio::test]
async fn feed_ranks_unswiped_offers_by_skill_overlap() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let candidate = app.candidate_with_skills(&["Rust", "Postgres"]).await;

    let weak = app.create_offer(&recruiter, &["Java", "Spring"], "published").await;
    let strong = app.create_offer(&recruiter, &["rust", "postgres"], "published").await;
    let swiped = app.create_offer(&recruiter, &["Rust"], "published").await;
    app.create_offer(&recruiter, &["Rust"], "draft").await;
    app.apply(&candidate, swiped).await;

    let (status, body) = app.get("/matches/feed", &candidate.access_token).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["offer"]["id"], strong.to_string());
    assert_eq!(items[0]["score_matching"], 100.0);
    assert_eq!(items[1]["offer"]["id"], weak.to_string());
    assert_eq!(items[1]["score_matching"], 0.0);

    let (_, body) = app.get("/matches/feed?limit=1", &candidate.access_token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
