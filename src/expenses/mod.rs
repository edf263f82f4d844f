pub mod dto;
pub mod format;
pub mod handlers;
pub mod policy;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod validation;

use crate::state::AppState;
use axum::Router;

pub use services::ExpenseService;

pub fn router() -> Router<AppState> {
    handlers::expense_routes()
}
