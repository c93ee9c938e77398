use axum::{extract::State, response::IntoResponse, Extension};

use crate::{
    dto::{
        stats_dto::{CandidateStats, RecruiterStats},
        ApiResponse,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/stats/recruiter",
    responses(
        (status = 200, description = "Pipeline counts for the recruiter's offers", body = RecruiterStats),
        (status = 403, description = "Caller is not a recruiter")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn recruiter_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let stats = state.stats_service.recruiter(&claims).await?;
    Ok(ApiResponse::ok(stats))
}

#[utoipa::path(
    get,
    path = "/stats/candidate",
    responses(
        (status = 200, description = "Swipe and application counts for the candidate", body = CandidateStats),
        (status = 403, description = "Caller is not a candidate")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn candidate_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let stats = state.stats_service.candidate(&claims).await?;
    Ok(ApiResponse::ok(stats))
}
