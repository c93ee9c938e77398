use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        interview_dto::{CreateInterviewPayload, UpdateInterviewPayload},
        ApiJson, ApiResponse,
    },
    error::Result,
    middleware::auth::Claims,
    models::interview::Interview,
    AppState,
};

#[utoipa::path(
    post,
    path = "/interviews",
    request_body = CreateInterviewPayload,
    responses(
        (status = 201, description = "Interview scheduled", body = Interview),
        (status = 400, description = "Invalid duration or date in the past"),
        (status = 403, description = "Not the offer's recruiter"),
        (status = 409, description = "Application already closed")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn create_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<CreateInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interview = state.interview_service.schedule(&claims, payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(interview).with_message("Interview scheduled"),
    ))
}

#[utoipa::path(
    get,
    path = "/interviews",
    responses((status = 200, description = "Interviews the caller takes part in", body = [Interview])),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn list_interviews(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let interviews = state.interview_service.list(&claims).await?;
    Ok(ApiResponse::ok(interviews))
}

#[utoipa::path(
    get,
    path = "/interviews/{id}",
    params(("id" = Uuid, Path, description = "Interview ID")),
    responses(
        (status = 200, description = "Interview found", body = Interview),
        (status = 404, description = "Interview not found")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn get_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let interview = state.interview_service.get(&claims, id).await?;
    Ok(ApiResponse::ok(interview))
}

#[utoipa::path(
    put,
    path = "/interviews/{id}",
    params(("id" = Uuid, Path, description = "Interview ID")),
    request_body = UpdateInterviewPayload,
    responses(
        (status = 200, description = "Interview updated", body = Interview),
        (status = 409, description = "Interview already completed or cancelled")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn update_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interview = state.interview_service.update(&claims, id, payload).await?;
    Ok(ApiResponse::ok(interview))
}
