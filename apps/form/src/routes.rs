use crate::state::AppState;
use crate::telemetry;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

pub mod health;
pub mod predict;

pub fn construct_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(predict::show_form).post(predict::submit_form))
        .route("/health", get(health::health))
        .route("/metrics", get(telemetry::handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
