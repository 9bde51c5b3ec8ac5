//! Shared application state passed to all handlers via Axum's `State` extractor.

use std::sync::Arc;

use trailhub_core::config::AppConfig;
use trailhub_core::result::AppResult;
use trailhub_core::types::DayBoundary;
use trailhub_database::{DatabasePool, HistoryRepository, HistoryStore};
use trailhub_service::{HistoryQueryEngine, HistoryRecorder, ViewerContext};

/// Application state shared across all request handlers.
///
/// Cloning is cheap: every field is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Database pool, used for health checks.
    pub db: DatabasePool,
    /// Write side of the history engine.
    pub recorder: HistoryRecorder,
    /// Read side of the history engine.
    pub engine: HistoryQueryEngine,
    /// Configured day boundary, used when a request names no zone.
    pub day_boundary: DayBoundary,
}

impl AppState {
    /// Wire the SQLite history repository over `db`.
    pub fn new(config: AppConfig, db: DatabasePool) -> AppResult<Self> {
        let store: Arc<dyn HistoryStore> = Arc::new(HistoryRepository::new(db.pool().clone()));
        Self::with_store(config, db, store)
    }

    /// Wire an arbitrary history store.
    pub fn with_store(
        config: AppConfig,
        db: DatabasePool,
        store: Arc<dyn HistoryStore>,
    ) -> AppResult<Self> {
        let day_boundary = config.history.day_boundary()?;
        Ok(Self {
            config: Arc::new(config),
            db,
            recorder: HistoryRecorder::new(Arc::clone(&store)),
            engine: HistoryQueryEngine::new(store),
            day_boundary,
        })
    }

    /// The viewer for a request, honouring an optional `tz` override.
    pub fn viewer(&self, tz: Option<&str>) -> ViewerContext {
        ViewerContext::resolve(self.day_boundary, tz)
    }
}
