//! The history store contract.

use async_trait::async_trait;

use trailhub_core::result::AppResult;
use trailhub_core::types::HistoryFilter;
use trailhub_entity::history::{FilterOptions, HistoryEntry, NewHistoryEntry};

/// Durable, append-only storage of history entries.
///
/// Implementations never update or delete an entry once appended. Free-text
/// search and day grouping happen above this layer.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist a new entry, assigning its id and (if absent) its timestamp.
    ///
    /// Only required-field presence is checked; a blank `entity_type`,
    /// `entity_id` or `action` is a validation error and nothing is written.
    async fn append(&self, entry: NewHistoryEntry) -> AppResult<HistoryEntry>;

    /// All entries matching every set axis of `filter`.
    async fn query(&self, filter: &HistoryFilter) -> AppResult<Vec<HistoryEntry>>;

    /// A single entry by id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<HistoryEntry>>;

    /// Every entry recorded against one business object.
    async fn find_by_entity(&self, entity_type: &str, entity_id: &str) -> AppResult<Vec<HistoryEntry>>;

    /// Distinct entity types and actions across the whole store.
    async fn filter_options(&self) -> AppResult<FilterOptions>;
}
