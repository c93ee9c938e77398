pub mod applications;
pub mod auth;
pub mod availability;
pub mod conversations;
pub mod docs;
pub mod health;
pub mod interviews;
pub mod jobs;
pub mod matches;
pub mod stats;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    auth::{optional_auth, require_auth},
    cors::api_cors,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Full HTTP surface. Public and authenticated routes sit on separate
/// routers so each gets its own auth and rate-limit layers.
pub fn router(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/:id", get(jobs::get_job))
        .layer(from_fn_with_state(state.clone(), optional_auth))
        .layer(from_fn_with_state(
            RateLimiter::new(state.config.public_rps),
            rps_middleware,
        ));

    let api = Router::new()
        .route("/auth/me", get(auth::me).put(auth::update_me))
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/mine", get(jobs::my_jobs))
        .route(
            "/jobs/:id",
            put(jobs::update_job).delete(jobs::delete_job),
        )
        .route("/matches/swipe", post(matches::swipe))
        .route("/matches/history", get(matches::history))
        .route("/matches/favorites", get(matches::favorites))
        .route("/matches/feed", get(matches::feed))
        .route("/applications", get(applications::list_applications))
        .route("/applications/:id", get(applications::get_application))
        .route("/applications/:id/status", put(applications::update_status))
        .route("/applications/:id/viewed", post(applications::mark_viewed))
        .route("/applications/:id/notes", put(applications::update_notes))
        .route("/applications/:id/withdraw", post(applications::withdraw))
        .route("/applications/:id/history", get(applications::history))
        .route(
            "/interviews",
            get(interviews::list_interviews).post(interviews::create_interview),
        )
        .route(
            "/interviews/:id",
            get(interviews::get_interview).put(interviews::update_interview),
        )
        .route(
            "/conversations",
            get(conversations::list_conversations).post(conversations::open_conversation),
        )
        .route("/conversations/unread", get(conversations::unread))
        .route(
            "/conversations/:id/messages",
            get(conversations::list_messages).post(conversations::send_message),
        )
        .route("/availability", put(availability::replace_availability))
        .route("/availability/:user_id", get(availability::get_availability))
        .route("/stats/recruiter", get(stats::recruiter_stats))
        .route("/stats/candidate", get(stats::candidate_stats))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .layer(from_fn_with_state(
            RateLimiter::new(state.config.api_rps),
            rps_middleware,
        ));

    public_api
        .merge(api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(api_cors())
        .layer(TraceLayer::new_for_http())
}
