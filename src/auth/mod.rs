use crate::state::AppState;
use axum::Router;

pub mod dto;
mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod tokens;

pub use services::{AuthService, CurrentUser};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
