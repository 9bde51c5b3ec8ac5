//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use trailhub_api::{AppState, build_app};
use trailhub_core::config::{AppConfig, DatabaseConfig, HistoryConfig};
use trailhub_database::{DatabasePool, HistoryRepository, HistoryStore};
use trailhub_entity::history::{HistoryEntry, NewHistoryEntry};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct access
    pub db: DatabasePool,
    /// Repository over the same pool, for seeding with fixed timestamps
    pub repo: HistoryRepository,
}

/// Configuration for an in-memory database with UTC day boundaries
pub fn test_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig::in_memory(),
        history: HistoryConfig {
            time_zone: "utc".to_string(),
        },
        ..AppConfig::default()
    }
}

impl TestApp {
    /// Create a new test application backed by a fresh in-memory database
    pub async fn new() -> Self {
        let config = test_config();
        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        trailhub_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(config, db.clone()).expect("Failed to build state");
        let repo = HistoryRepository::new(db.pool().clone());

        Self {
            router: build_app(state),
            db,
            repo,
        }
    }

    /// Insert an entry directly, bypassing HTTP
    pub async fn seed(&self, entry: NewHistoryEntry) -> HistoryEntry {
        self.repo.append(entry).await.expect("Failed to seed entry")
    }

    /// Make a request against the router
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.raw_request(method, path, body_str).await
    }

    /// Make a request with a literal body
    pub async fn raw_request(&self, method: &str, path: &str, body: String) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
