//! HTTP binding and operator CLI support for Eventify.
//!
//! [`create_app`] assembles the Axum router over an [`AppState`]; the binary
//! in `main.rs` only loads configuration, connects a backend and serves it.

pub mod api_types;
pub mod handlers;
pub mod infra;
pub mod routes;
pub mod seed;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use infra::app_state::AppState;

/// Build the full application router: `/health` plus the versioned API.
pub fn create_app(state: AppState) -> Router {
    let versioned_api = routes::create_api_router(state.clone());

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(versioned_api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
