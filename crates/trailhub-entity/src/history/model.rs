//! History entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trailhub_core::error::AppError;

use super::action::ActionKind;

/// An immutable record of one state-changing event against a business object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Store-assigned, monotonically increasing identifier.
    pub id: i64,
    /// Kind of business object affected (e.g. `"invoice"`, `"user"`).
    pub entity_type: String,
    /// Identifier of the object within its type.
    pub entity_id: String,
    /// Human-readable label of the object at the time of the event.
    pub entity_name: Option<String>,
    /// The action performed, stored verbatim.
    pub action: String,
    /// Raw serialized change payload.
    pub changes: Option<String>,
    /// Actor identifier, absent for system events.
    pub user_id: Option<String>,
    /// Actor display name, absent for system events.
    pub user_name: Option<String>,
    /// When the event happened.
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// The display label, falling back to `"{entity_type} #{entity_id}"`.
    pub fn display_name(&self) -> String {
        match self.entity_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} #{}", self.entity_type, self.entity_id),
        }
    }

    /// The action classified for display; unknown strings count as updates.
    pub fn action_kind(&self) -> ActionKind {
        ActionKind::classify(&self.action)
    }

    /// Whether the entry carries a non-empty change payload.
    pub fn has_changes(&self) -> bool {
        self.changes.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// Data required to append a new history entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    /// Kind of business object affected.
    pub entity_type: String,
    /// Identifier of the object within its type.
    pub entity_id: String,
    /// Optional display label.
    pub entity_name: Option<String>,
    /// The action performed.
    pub action: String,
    /// Raw serialized change payload.
    pub changes: Option<String>,
    /// Actor identifier.
    pub user_id: Option<String>,
    /// Actor display name.
    pub user_name: Option<String>,
    /// Event time; the store stamps the current time when absent.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewHistoryEntry {
    /// Start an entry for `entity_type`/`entity_id` with the given action.
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

    /// Set the raw change payload.
    pub fn with_changes(mut self, changes: impl Into<String>) -> Self {
        self.changes = Some(changes.into());
        self
    }

    /// Attribute the entry to an actor.
    pub fn by(mut self, user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.user_name = Some(user_name.into());
        self
    }

    /// Pin the event time.
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Check required-field presence. No business validation is applied.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("entity_type", &self.entity_type),
            ("entity_id", &self.entity_id),
            ("action", &self.action),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// Materialize the stored entry once the store has assigned id and time.
    pub fn into_entry(self, id: i64, created_at: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            id,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            entity_name: self.entity_name,
            action: self.action,
            changes: self.changes,
            user_id: self.user_id,
            user_name: self.user_name,
            created_at,
        }
    }
}

/// Distinct values present across the whole store, for filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Distinct entity types, ascending.
    pub entity_types: Vec<String>,
    /// Distinct action strings, ascending.
    pub actions: Vec<String>,
}
