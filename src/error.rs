use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::validation::ValidationErrors;

/// Failures raised by the repository implementations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    /// Maps unique (23505) and foreign-key (23503) violations, passes the rest through.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if matches!(db_err.code().as_deref(), Some("23505") | Some("23503")) {
                return Self::ConstraintViolation(db_err.message().to_string());
            }
        }
        Self::Database(e)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("the given data was invalid")]
    Validation(ValidationErrors),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("this action is unauthorized")]
    Forbidden,

    #[error("no query results for model [{model}] {id}")]
    NotFound { model: &'static str, id: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(model: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            model,
            id: id.to_string(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        Self::Internal(anyhow::Error::new(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "message": "The given data was invalid.", "errors": errors }),
            ),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Unauthenticated." }),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": "Unauthorized" }),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({ "message": "This action is unauthorized." }),
            ),
            AppError::NotFound { model, id } => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("No query results for model [{}] {}", model, id) }),
            ),
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Server Error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
