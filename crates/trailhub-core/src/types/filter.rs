//! Structural filter axes understood by the history store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-level filter for history queries.
///
/// Every axis is independently optional; `None` means "no filter on this
/// axis". Set axes are combined with AND. `from` is inclusive and `to` is
/// exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    /// Exact entity type.
    pub entity_type: Option<String>,
    /// Exact action string.
    pub action: Option<String>,
    /// Exact actor identifier.
    pub user_id: Option<String>,
    /// Lower time bound (inclusive).
    pub from: Option<DateTime<Utc>>,
    /// Upper time bound (exclusive).
    pub to: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    /// A filter with no constraints.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one entity type.
    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Restrict to one action.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Restrict to one actor.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Restrict to entries at or after `from`.
    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Restrict to entries strictly before `to`.
    pub fn until(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    /// Whether no axis is constrained.
    pub fn is_unbounded(&self) -> bool {
        self.entity_type.is_none()
            && self.action.is_none()
            && self.user_id.is_none()
            && self.from.is_none()
            && self.to.is_none()
    }
}
