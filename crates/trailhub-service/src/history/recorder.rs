//! The write side: one history entry per logical mutation.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use trailhub_core::result::AppResult;
use trailhub_database::HistoryStore;
use trailhub_entity::history::{ChangePayload, FieldChange, NewHistoryEntry};

/// Change payload supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordChanges {
    /// Canonical before/after triples.
    Diff(Vec<FieldChange>),
    /// Field names mapped to new values only.
    Mapping(Vec<(String, String)>),
    /// Free-form description.
    Text(String),
}

impl RecordChanges {
    /// Classify a raw string the way stored payloads are classified.
    pub fn from_raw(raw: &str) -> Option<Self> {
        ChangePayload::detect(raw).map(Self::from)
    }

    /// Classify a JSON value received over the wire. `null` means no changes.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self::Text(text)),
            Value::Array(_) | Value::Object(_) => Self::from_raw(&value.to_string()),
            other => Some(Self::Text(other.to_string())),
        }
    }

    /// The text stored in the `changes` column.
    pub fn into_raw(self) -> String {
        ChangePayload::from(self).to_raw()
    }
}

impl From<ChangePayload> for RecordChanges {
    fn from(payload: ChangePayload) -> Self {
        match payload {
            ChangePayload::DiffList(changes) => Self::Diff(changes),
            ChangePayload::LegacyMapping(pairs) => Self::Mapping(pairs),
            ChangePayload::RawText(text) => Self::Text(text),
        }
    }
}

impl From<RecordChanges> for ChangePayload {
    fn from(changes: RecordChanges) -> Self {
        match changes {
            RecordChanges::Diff(changes) => Self::DiffList(changes),
            RecordChanges::Mapping(pairs) => Self::LegacyMapping(pairs),
            RecordChanges::Text(text) => Self::RawText(text),
        }
    }
}

/// A request to record one event.
#[derive(Debug, Clone, Default)]
pub struct RecordHistory {
    pub entity_type: String,
    pub entity_id: String,
    pub entity_name: Option<String>,
    pub action: String,
    pub changes: Option<RecordChanges>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
}

impl RecordHistory {
    /// Start a record request.
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            action: action.into(),
            ..Self::default()
        }
    }

    /// Set the display label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    /// Attach a change payload.
    pub fn with_changes(mut self, changes: RecordChanges) -> Self {
        self.changes = Some(changes);
        self
    }

    /// Attribute the event to an actor.
    pub fn by(mut self, user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.user_name = Some(user_name.into());
        self
    }

    fn into_new_entry(self) -> NewHistoryEntry {
        NewHistoryEntry {
            entity_type: self.entity_type.trim().to_string(),
            entity_id: self.entity_id.trim().to_string(),
            entity_name: self.entity_name,
            action: self.action.trim().to_string(),
            changes: self.changes.map(RecordChanges::into_raw),
            user_id: self.user_id,
            user_name: self.user_name,
            created_at: None,
        }
    }
}

/// Records history entries into the store.
#[derive(Clone)]
pub struct HistoryRecorder {
    store: Arc<dyn HistoryStore>,
}

impl std::fmt::Debug for HistoryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryRecorder").finish_non_exhaustive()
    }
}

impl HistoryRecorder {
    /// Creates a new recorder.
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Record one event and return the assigned id.
    ///
    /// Validation failures write nothing. Storage failures are returned to
    /// the caller without retry.
    pub async fn record(&self, request: RecordHistory) -> AppResult<i64> {
        let entry = request.into_new_entry();
        entry.validate()?;

        match self.store.append(entry).await {
            Ok(stored) => {
                debug!(id = stored.id, "History recorded");
                Ok(stored.id)
            }
            Err(e) => {
                if e.is_storage() {
                    warn!(error = %e, "Failed to record history entry");
                }
                Err(e)
            }
        }
    }
}
