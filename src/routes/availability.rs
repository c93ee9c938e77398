use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{availability_dto::ReplaceAvailabilityPayload, ApiJson, ApiResponse},
    error::Result,
    middleware::auth::Claims,
    models::availability::AvailabilitySlot,
    AppState,
};

#[utoipa::path(
    get,
    path = "/availability/{user_id}",
    params(("user_id" = Uuid, Path, description = "User whose weekly slots to read")),
    responses((status = 200, description = "Weekly availability", body = [AvailabilitySlot])),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let slots = state.availability_service.list(user_id).await?;
    Ok(ApiResponse::ok(slots))
}

#[utoipa::path(
    put,
    path = "/availability",
    request_body = ReplaceAvailabilityPayload,
    responses(
        (status = 200, description = "Schedule replaced", body = [AvailabilitySlot]),
        (status = 400, description = "Malformed or overlapping slots")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn replace_availability(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<ReplaceAvailabilityPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let slots = state.availability_service.replace(&claims, payload).await?;
    Ok(ApiResponse::ok(slots).with_message("Availability saved"))
}
