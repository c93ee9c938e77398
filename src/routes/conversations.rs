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
        conversation_dto::{OpenConversationPayload, SendMessagePayload, UnreadResponse},
        ApiJson, ApiResponse,
    },
    error::Result,
    middleware::auth::Claims,
    models::conversation::{Conversation, Message},
    AppState,
};

#[utoipa::path(
    post,
    path = "/conversations",
    request_body = OpenConversationPayload,
    responses(
        (status = 200, description = "Conversation for the application, created on first use", body = Conversation),
        (status = 403, description = "Caller is not a participant")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn open_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<OpenConversationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let conversation = state
        .conversation_service
        .open(&claims, payload.application_id)
        .await?;
    Ok(ApiResponse::ok(conversation))
}

#[utoipa::path(
    get,
    path = "/conversations",
    responses((status = 200, description = "The caller's conversations, most recent activity first", body = [Conversation])),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let conversations = state.conversation_service.list(&claims).await?;
    Ok(ApiResponse::ok(conversations))
}

#[utoipa::path(
    get,
    path = "/conversations/{id}/messages",
    params(("id" = Uuid, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Messages in sending order", body = [Message]),
        (status = 403, description = "Caller is not a participant")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let messages = state.conversation_service.messages(&claims, id).await?;
    Ok(ApiResponse::ok(messages))
}

#[utoipa::path(
    post,
    path = "/conversations/{id}/messages",
    params(("id" = Uuid, Path, description = "Conversation ID")),
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Empty or oversized body")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let message = state
        .conversation_service
        .send(&claims, id, &payload.body)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(message)))
}

#[utoipa::path(
    get,
    path = "/conversations/unread",
    responses((status = 200, description = "Unread messages addressed to the caller", body = UnreadResponse)),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn unread(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let unread = state.conversation_service.unread(&claims).await?;
    Ok(ApiResponse::ok(UnreadResponse { unread }))
}
