pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod expenses;
pub mod extract;
pub mod memory;
pub mod notifications;
pub mod state;
pub mod validation;

pub use app::build_app;
pub use state::AppState;
