use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/range", get(handlers::get_range))
        .route("/api/series", get(handlers::get_series))
        .route("/api/plays", get(handlers::get_plays))
        .route("/api/locations", get(handlers::get_locations))
        .with_state(state)
}
