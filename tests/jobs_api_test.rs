mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn drafts_stay_private_until_published() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let offer_id = app.create_offer(&recruiter, &["Rust"], "draft").await;

    let (status, _) = app
        .request(Method::GET, &format!("/jobs/{offer_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .get(&format!("/jobs/{offer_id}"), &recruiter.access_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "draft");

    let (status, body) = app.request(Method::GET, "/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 0);

    let (status, body) = app
        .put(
            &format!("/jobs/{offer_id}"),
            &recruiter.access_token,
            json!({ "status": "published" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app.request(Method::GET, "/jobs?search=backend", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["id"], offer_id.to_string());
}

#[tokio::test]
async fn only_recruiters_create_offers() {
    let app = TestApp::new();
    let candidate = app.register("candidate").await;
    let (status, body) = app
        .post(
            "/jobs",
            &candidate.access_token,
            json!({
                "title": "Backend engineer",
                "company": "Acme",
                "location": "Paris",
                "description": "Build APIs"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = app
        .request(
            Method::POST,
            "/jobs",
            None,
            Some(json!({ "title": "x", "company": "y", "location": "z", "description": "d" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inverted_salary_range_is_refused() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let (status, _) = app
        .post(
            "/jobs",
            &recruiter.access_token,
            json!({
                "title": "Backend engineer",
                "company": "Acme",
                "location": "Paris",
                "description": "Build APIs",
                "salary_min": 70000,
                "salary_max": 50000
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn other_recruiters_cannot_edit_an_offer() {
    let app = TestApp::new();
    let owner = app.register("recruiter").await;
    let intruder = app.register("recruiter").await;
    let offer_id = app.create_offer(&owner, &["Rust"], "published").await;

    let (status, _) = app
        .put(
            &format!("/jobs/{offer_id}"),
            &intruder.access_token,
            json!({ "title": "Hijacked" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/jobs/{offer_id}"),
            Some(&intruder.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_an_offer_with_applications_closes_it() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let candidate = app.register("candidate").await;
    let applied = app.create_offer(&recruiter, &["Rust"], "published").await;
    let untouched = app.create_offer(&recruiter, &["Go"], "published").await;
    app.apply(&candidate, applied).await;

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/jobs/{applied}"),
            Some(&recruiter.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["outcome"], "closed");

    let (_, body) = app
        .get(&format!("/jobs/{applied}"), &recruiter.access_token)
        .await;
    assert_eq!(body["data"]["status"], "closed");

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/jobs/{untouched}"),
            Some(&recruiter.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "deleted");

    let (status, _) = app
        .get(&format!("/jobs/{untouched}"), &recruiter.access_token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn my_jobs_lists_every_status_for_the_owner() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let other = app.register("recruiter").await;
    app.create_offer(&recruiter, &[], "draft").await;
    app.create_offer(&recruiter, &[], "published").await;
    app.create_offer(&other, &[], "published").await;

    let (status, body) = app.get("/jobs/mine", &recruiter.access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn deleting_a_swiped_offer_keeps_swipe_history() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    let candidate = app.register("candidate").await;
    let liked = app.create_offer(&recruiter, &[], "published").await;
    let passed = app.create_offer(&recruiter, &[], "published").await;

    for (offer_id, action) in [(liked, "favorite"), (passed, "left")] {
        let (status, _) = app
            .post(
                "/matches/swipe",
                &candidate.access_token,
                json!({ "offer_id": offer_id, "action": action }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    for offer_id in [liked, passed] {
        let (status, body) = app
            .request(
                Method::DELETE,
                &format!("/jobs/{offer_id}"),
                Some(&recruiter.access_token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["outcome"], "closed");
    }

    let (_, body) = app.get("/matches/history", &candidate.access_token).await;
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = app.get("/stats/candidate", &candidate.access_token).await;
    assert_eq!(body["data"]["total_swipes"], 2);

    let (status, body) = app.get("/matches/favorites", &candidate.access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], liked.to_string());
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let app = TestApp::new();
    let recruiter = app.register("recruiter").await;
    app.create_offer(&recruiter, &["Rust"], "published").await;

    let (status, body) = app
        .request(Method::GET, "/jobs?page=9223372036854775807&per_page=100", None, None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["total"], 1);
}
