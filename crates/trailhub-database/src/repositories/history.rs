//! History entry repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};

use trailhub_core::error::{AppError, ErrorKind};
use trailhub_core::result::AppResult;
use trailhub_core::types::HistoryFilter;
use trailhub_entity::history::{FilterOptions, HistoryEntry, NewHistoryEntry};

use crate::store::HistoryStore;

const SELECT_COLUMNS: &str = "SELECT id, entity_type, entity_id, entity_name, action, changes, \
     user_id, user_name, created_at FROM history_entries";

const ORDER_CLAUSE: &str = "ORDER BY created_at DESC, id ASC";

/// Raw row shape; `created_at` is stored as Unix milliseconds.
#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    entity_type: String,
    entity_id: String,
    entity_name: Option<String>,
    action: String,
    changes: Option<String>,
    user_id: Option<String>,
    user_name: Option<String>,
    created_at: i64,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            entity_name: row.entity_name,
            action: row.action,
            changes: row.changes,
            user_id: row.user_id,
            user_name: row.user_name,
            created_at: DateTime::from_timestamp_millis(row.created_at)
                .unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}

/// SQLite-backed [`HistoryStore`].
///
/// Appends are serialized so that store-assigned timestamps never run
/// backwards relative to ids.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
    /// Last timestamp (ms) handed out by the store.
    write_lock: Arc<Mutex<i64>>,
}

impl HistoryRepository {
    /// Create a new history repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(i64::MIN)),
        }
    }

    /// Count all stored entries.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM history_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count history entries", e))
    }

    async fn distinct(&self, column: &str) -> AppResult<Vec<String>> {
        let sql = format!("SELECT DISTINCT {column} FROM history_entries ORDER BY {column}");
        sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to list distinct {column}"), e)
            })
    }
}

#[async_trait]
impl HistoryStore for HistoryRepository {
    async fn append(&self, entry: NewHistoryEntry) -> AppResult<HistoryEntry> {
        entry.validate()?;

        let mut last_stamp = self.write_lock.lock().await;
        let created_at = match entry.created_at {
            Some(at) => at,
            None => {
                let now = Utc::now().timestamp_millis().max(*last_stamp);
                DateTime::from_timestamp_millis(now).unwrap_or_else(Utc::now)
            }
        };
        let millis = created_at.timestamp_millis();

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO history_entries \
             (entity_type, entity_id, entity_name, action, changes, user_id, user_name, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.entity_name)
        .bind(&entry.action)
        .bind(&entry.changes)
        .bind(&entry.user_id)
        .bind(&entry.user_name)
        .bind(millis)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append history entry", e))?;

        if entry.created_at.is_none() {
            *last_stamp = millis;
        }
        drop(last_stamp);

        info!(
            id,
            entity_type = %entry.entity_type,
            entity_id = %entry.entity_id,
            action = %entry.action,
            "History entry appended"
        );
        Ok(entry.into_entry(id, created_at))
    }

    async fn query(&self, filter: &HistoryFilter) -> AppResult<Vec<HistoryEntry>> {
        let mut conditions = Vec::new();
        if filter.entity_type.is_some() {
            conditions.push("entity_type = ?");
        }
        if filter.action.is_some() {
            conditions.push("action = ?");
        }
        if filter.user_id.is_some() {
            conditions.push("user_id = ?");
        }
        if filter.from.is_some() {
            conditions.push("created_at >= ?");
        }
        if filter.to.is_some() {
            conditions.push("created_at < ?");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!("{SELECT_COLUMNS} {where_clause} {ORDER_CLAUSE}");

        let mut query = sqlx::query_as::<_, HistoryRow>(&sql);
        if let Some(entity_type) = &filter.entity_type {
            query = query.bind(entity_type);
        }
        if let Some(action) = &filter.action {
            query = query.bind(action);
        }
        if let Some(user_id) = &filter.user_id {
            query = query.bind(user_id);
        }
        if let Some(from) = filter.from {
            query = query.bind(from.timestamp_millis());
        }
        if let Some(to) = filter.to {
            query = query.bind(to.timestamp_millis());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query history", e))?;

        debug!(count = rows.len(), "History query completed");
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<HistoryEntry>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        sqlx::query_as::<_, HistoryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(HistoryEntry::from))
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find history entry", e))
    }

    async fn find_by_entity(&self, entity_type: &str, entity_id: &str) -> AppResult<Vec<HistoryEntry>> {
        let sql = format!("{SELECT_COLUMNS} WHERE entity_type = ? AND entity_id = ? {ORDER_CLAUSE}");
        let rows = sqlx::query_as::<_, HistoryRow>(&sql)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load entity history", e)
            })?;

        debug!(entity_type, entity_id, count = rows.len(), "Entity history loaded");
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    async fn filter_options(&self) -> AppResult<FilterOptions> {
        Ok(FilterOptions {
            entity_types: self.distinct("entity_type").await?,
            actions: self.distinct("action").await?,
        })
    }
}
