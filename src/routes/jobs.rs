use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        offer_dto::{
            CreateOfferPayload, OfferListQuery, OfferRemovalResponse, OfferResponse,
            UpdateOfferPayload,
        },
        ApiJson, ApiResponse,
    },
    error::Result,
    middleware::auth::Claims,
    services::offer_service::OfferList,
    AppState,
};

fn list_response(list: OfferList) -> ApiResponse<Vec<OfferResponse>> {
    let pagination = list.params.pagination(list.total);
    let items = list.items.into_iter().map(OfferResponse::from).collect();
    ApiResponse::paginated(items, pagination)
}

#[utoipa::path(
    post,
    path = "/jobs",
    request_body = CreateOfferPayload,
    responses(
        (status = 201, description = "Offer created", body = OfferResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not a recruiter")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<CreateOfferPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let offer = state.offer_service.create(&claims, payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(OfferResponse::from(offer)).with_message("Offer created"),
    ))
}

#[utoipa::path(
    get,
    path = "/jobs",
    params(
        ("status" = Option<String>, Query, description = "draft, published or closed; non-published only lists the caller's offers"),
        ("search" = Option<String>, Query, description = "Matches title, company or description"),
        ("location" = Option<String>, Query, description = "Location substring"),
        ("remote" = Option<bool>, Query, description = "Remote offers only"),
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, at most 100")
    ),
    responses((status = 200, description = "Offers", body = [OfferResponse]))
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Query(query): Query<OfferListQuery>,
) -> Result<impl IntoResponse> {
    let viewer = claims.as_ref().map(|Extension(c)| c);
    let list = state.offer_service.list(viewer, query).await?;
    Ok(list_response(list))
}

#[utoipa::path(
    get,
    path = "/jobs/mine",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, at most 100")
    ),
    responses((status = 200, description = "The recruiter's own offers", body = [OfferResponse])),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn my_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OfferListQuery>,
) -> Result<impl IntoResponse> {
    let list = state.offer_service.mine(&claims, query).await?;
    Ok(list_response(list))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    params(("id" = Uuid, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer found", body = OfferResponse),
        (status = 404, description = "Offer not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let viewer = claims.as_ref().map(|Extension(c)| c);
    let offer = state.offer_service.get(viewer, id).await?;
    Ok(ApiResponse::ok(OfferResponse::from(offer)))
}

#[utoipa::path(
    put,
    path = "/jobs/{id}",
    params(("id" = Uuid, Path, description = "Offer ID")),
    request_body = UpdateOfferPayload,
    responses(
        (status = 200, description = "Offer updated", body = OfferResponse),
        (status = 403, description = "Not the offer's recruiter"),
        (status = 404, description = "Offer not found")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateOfferPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let offer = state.offer_service.update(&claims, id, payload).await?;
    Ok(ApiResponse::ok(OfferResponse::from(offer)))
}

#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    params(("id" = Uuid, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer deleted, or closed when it has applications", body = OfferRemovalResponse),
        (status = 403, description = "Not the offer's recruiter"),
        (status = 404, description = "Offer not found")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let removal = state.offer_service.remove(&claims, id).await?;
    Ok(ApiResponse::ok(removal))
}
