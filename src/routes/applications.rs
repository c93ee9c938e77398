use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        application_dto::{
            ApplicationListQuery, ApplicationResponse, NotesPayload, UpdateStatusPayload,
            WithdrawPayload,
        },
        ApiJson, ApiResponse,
    },
    error::Result,
    middleware::auth::Claims,
    models::audit_log::AuditLog,
    AppState,
};

#[utoipa::path(
    get,
    path = "/applications",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("offer_id" = Option<Uuid>, Query, description = "Filter by offer"),
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, at most 100")
    ),
    responses((status = 200, description = "Own applications (candidate) or applications to own offers (recruiter)", body = [ApplicationResponse])),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let list = state.application_service.list(&claims, query).await?;
    let pagination = list.params.pagination(list.total);
    let items: Vec<ApplicationResponse> = list
        .items
        .into_iter()
        .map(ApplicationResponse::from)
        .collect();
    Ok(ApiResponse::paginated(items, pagination))
}

#[utoipa::path(
    get,
    path = "/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application with its progress step", body = ApplicationResponse),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Application not found")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(&claims, id).await?;
    Ok(ApiResponse::ok(ApplicationResponse::from(application)))
}

#[utoipa::path(
    put,
    path = "/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = ApplicationResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Not the offer's recruiter"),
        (status = 409, description = "Illegal transition or stale version")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .update_status(&claims, id, payload)
        .await?;
    Ok(ApiResponse::ok(ApplicationResponse::from(application)).with_message("Status updated"))
}

#[utoipa::path(
    post,
    path = "/applications/{id}/viewed",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application marked as viewed", body = ApplicationResponse),
        (status = 409, description = "Application is no longer new")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn mark_viewed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.mark_viewed(&claims, id).await?;
    Ok(ApiResponse::ok(ApplicationResponse::from(application)))
}

#[utoipa::path(
    put,
    path = "/applications/{id}/notes",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = NotesPayload,
    responses((status = 200, description = "Recruiter notes saved", body = ApplicationResponse)),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn update_notes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<NotesPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .update_notes(&claims, id, payload.notes)
        .await?;
    Ok(ApiResponse::ok(ApplicationResponse::from(application)))
}

#[utoipa::path(
    post,
    path = "/applications/{id}/withdraw",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = WithdrawPayload,
    responses(
        (status = 200, description = "Application withdrawn", body = ApplicationResponse),
        (status = 403, description = "Not the candidate's application"),
        (status = 409, description = "Application already closed")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    payload: Option<ApiJson<WithdrawPayload>>,
) -> Result<impl IntoResponse> {
    let payload = payload.map(|ApiJson(p)| p).unwrap_or_default();
    payload.validate()?;
    let application = state
        .application_service
        .withdraw(&claims, id, payload.reason)
        .await?;
    Ok(ApiResponse::ok(ApplicationResponse::from(application)).with_message("Application withdrawn"))
}

#[utoipa::path(
    get,
    path = "/applications/{id}/history",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses((status = 200, description = "Recorded changes, oldest first", body = [AuditLog])),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let entries = state.application_service.history(&claims, id).await?;
    Ok(ApiResponse::ok(entries))
}
