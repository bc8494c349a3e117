pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::progress;
use crate::roadmap::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Roadmap API
        .route(
            "/api/v1/roadmaps/generate",
            post(handlers::handle_generate_roadmap),
        )
        .route(
            "/api/v1/users/:user_id/roadmap",
            get(handlers::handle_get_roadmap),
        )
        // Progress API — independent of generation by design
        .route(
            "/api/v1/users/:user_id/progress",
            get(progress::handle_get_progress).put(progress::handle_update_progress),
        )
        .with_state(state)
}
