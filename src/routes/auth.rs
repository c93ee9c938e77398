use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension};
use validator::Validate;

use crate::{
    dto::{
        auth_dto::{
            AuthResponse, LoginPayload, RefreshPayload, RegisterPayload, UpdateProfilePayload,
            UserResponse,
        },
        ApiJson, ApiResponse,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let auth = state.auth_service.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(auth).with_message("Account created"),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let auth = state.auth_service.login(payload).await?;
    Ok(ApiResponse::ok(auth))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshPayload,
    responses(
        (status = 200, description = "New token pair", body = AuthResponse),
        (status = 401, description = "Refresh token unknown, expired or already used")
    )
)]
#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let auth = state.auth_service.refresh(&payload.refresh_token).await?;
    Ok(ApiResponse::ok(auth))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body = RefreshPayload,
    responses((status = 200, description = "Refresh token revoked"))
)]
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.auth_service.logout(&payload.refresh_token).await?;
    Ok(ApiResponse::ok(()).with_message("Signed out"))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.me(&claims).await?;
    Ok(ApiResponse::ok(user))
}

#[utoipa::path(
    put,
    path = "/auth/me",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid payload")
    ),
    security(("bearer_auth" = []))
)]
#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.auth_service.update_profile(&claims, payload).await?;
    Ok(ApiResponse::ok(user))
}
