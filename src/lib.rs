pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// The HTTP application over `state`, with every route and global layer.
pub fn app(state: AppState) -> axum::Router {
    handlers::router(state)
}
