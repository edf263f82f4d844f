use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::services::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthenticated)?;

        // Expect "Bearer <token>", scheme in any case
        let (scheme, token) = auth.split_once(' ').ok_or(AppError::Unauthenticated)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AppError::Unauthenticated);
        }

        state.auth.authenticate(token.trim()).await
    }
}
