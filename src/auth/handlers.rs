use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, LogoutResponse, RegisterRequest},
        services::CurrentUser,
    },
    error::AppError,
    extract::JsonBody,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let data = state.auth.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            data,
            message: "User registered successfully.",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let data = state.auth.login(payload).await?;
    Ok(Json(AuthResponse {
        success: true,
        data,
        message: "User login successfully.",
    }))
}

#[instrument(skip(state, current), fields(user_id = %current.user.id))]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<LogoutResponse>, AppError> {
    state.auth.logout(&current).await?;
    Ok(Json(LogoutResponse {
        status: "success",
        message: "User logged out successfully",
    }))
}
