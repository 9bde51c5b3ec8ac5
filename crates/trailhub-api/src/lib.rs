//! # trailhub-api
//!
//! HTTP API layer for TrailHub built on Axum.
//!
//! Provides the history REST endpoints, middleware (CORS, request
//! logging), DTOs, and the server entry point.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
