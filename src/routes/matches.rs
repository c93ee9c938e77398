use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use validator::Validate;

use crate::{
    dto::{
        offer_dto::OfferResponse,
        swipe_dto::{FeedItem, FeedQuery, SwipeHistoryQuery, SwipePayload, SwipeResponse},
        ApiJson, ApiResponse,
    },
    error::Result,
    middleware::auth::Claims,
    models::swipe::SwipeEvent,
    AppState,
};

#[utoipa::path(
    post,
    path = "/matches/swipe",
    request_body = SwipePayload,
    responses(
        (status = 201, description = "Swipe recorded; a right swipe also returns the new application", body = SwipeResponse),
        (status = 400, description = "Unknown action, score out of range or offer not published"),
        (status = 404, description = "Offer not found"),
        (status = 409, description = "Offer already swiped")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn swipe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<SwipePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state.swipe_service.swipe(&claims, payload).await?;
    let message = match outcome.application {
        Some(_) => "Application sent",
        None => "Swipe recorded",
    };
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(outcome).with_message(message),
    ))
}

#[utoipa::path(
    get,
    path = "/matches/history",
    params(
        ("action" = Option<String>, Query, description = "right, left or favorite"),
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, at most 100")
    ),
    responses((status = 200, description = "The caller's swipes, newest first", body = [SwipeEvent])),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<SwipeHistoryQuery>,
) -> Result<impl IntoResponse> {
    let history = state.swipe_service.history(&claims, query).await?;
    let pagination = history.params.pagination(history.total);
    Ok(ApiResponse::paginated(history.items, pagination))
}

#[utoipa::path(
    get,
    path = "/matches/favorites",
    responses((status = 200, description = "Offers the caller favorited", body = [OfferResponse])),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn favorites(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let offers = state.swipe_service.favorites(&claims).await?;
    let items: Vec<OfferResponse> = offers.into_iter().map(OfferResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/matches/feed",
    params(("limit" = Option<i64>, Query, description = "Number of offers, at most 100")),
    responses((status = 200, description = "Unswiped published offers, best match first", body = [FeedItem])),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn feed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse> {
    let items = state.swipe_service.feed(&claims, query.limit).await?;
    Ok(ApiResponse::ok(items))
}
