//! Route definitions for the TrailHub HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(history_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Record, query, filter options, detail, and per-entity timelines
fn history_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/history",
            post(handlers::history::record_history).get(handlers::history::list_history),
        )
        .route("/history/filters", get(handlers::history::filter_options))
        .route("/history/{id}", get(handlers::history::get_history_entry))
        .route(
            "/history/entities/{entity_type}/{entity_id}",
            get(handlers::history::entity_history),
        )
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
