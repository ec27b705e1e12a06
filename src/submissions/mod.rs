pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod scoring;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::submission_routes()
}
