use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::CurrentUser,
    error::AppError,
    extract::JsonBody,
    expenses::dto::{DataEnvelope, ExpenseInput, ExpenseResource},
    state::AppState,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(index).post(store))
        .route(
            "/expenses/:id",
            get(show).put(update).patch(update).delete(destroy),
        )
}

#[instrument(skip(state, current), fields(user_id = %current.user.id))]
pub async fn index(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<DataEnvelope<Vec<ExpenseResource>>>, AppError> {
    let items = state.expenses.list(&current.user).await?;
    Ok(Json(DataEnvelope::new(items)))
}

#[instrument(skip(state, current, body), fields(user_id = %current.user.id))]
pub async fn store(
    State(state): State<AppState>,
    current: CurrentUser,
    JsonBody(body): JsonBody<ExpenseInput>,
) -> Result<(StatusCode, Json<DataEnvelope<ExpenseResource>>), AppError> {
    let created = state.expenses.create(&current.user, body).await?;
    Ok((StatusCode::CREATED, Json(DataEnvelope::new(created))))
}

#[instrument(skip(state, current), fields(user_id = %current.user.id))]
pub async fn show(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<ExpenseResource>>, AppError> {
    let expense = state.expenses.show(&current.user, &id).await?;
    Ok(Json(DataEnvelope::new(expense)))
}

#[instrument(skip(state, current, body), fields(user_id = %current.user.id))]
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ExpenseInput>,
) -> Result<Json<DataEnvelope<ExpenseResource>>, AppError> {
    let expense = state.expenses.update(&current.user, &id, body).await?;
    Ok(Json(DataEnvelope::new(expense)))
}

#[instrument(skip(state, current), fields(user_id = %current.user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.expenses.destroy(&current.user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
