//! The read side: structural filtering, free-text search, and calendar-day
//! grouping of history entries.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use trailhub_core::error::AppError;
use trailhub_core::result::AppResult;
use trailhub_core::types::HistoryFilter;
use trailhub_database::HistoryStore;
use trailhub_entity::history::{FilterOptions, HistoryEntry};

use crate::context::ViewerContext;

/// Raw, user-supplied query criteria.
///
/// Every field is optional. A blank value or the literal `"all"` means no
/// filter on that axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryCriteria {
    /// Case-insensitive substring matched against name, action, actor, and type.
    pub search: Option<String>,
    /// Exact entity type.
    pub entity_type: Option<String>,
    /// Exact action.
    pub action: Option<String>,
    /// `YYYY-MM-DD` (start of that day) or an RFC 3339 instant, inclusive.
    pub date_from: Option<String>,
    /// `YYYY-MM-DD` (the whole day included) or an RFC 3339 instant, exclusive.
    pub date_to: Option<String>,
}

fn axis(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl HistoryCriteria {
    /// Criteria with no constraints.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn date_from(mut self, from: impl Into<String>) -> Self {
        self.date_from = Some(from.into());
        self
    }

    pub fn date_to(mut self, to: impl Into<String>) -> Self {
        self.date_to = Some(to.into());
        self
    }

    /// Whether any axis would constrain the result.
    pub fn has_active_filters(&self) -> bool {
        [
            &self.search,
            &self.entity_type,
            &self.action,
            &self.date_from,
            &self.date_to,
        ]
        .into_iter()
        .any(|value| axis(value).is_some())
    }

    /// The structural part of these criteria, resolved in the viewer's zone.
    ///
    /// Unparsable dates leave their bound open.
    pub fn to_filter(&self, viewer: &ViewerContext) -> HistoryFilter {
        HistoryFilter {
            entity_type: axis(&self.entity_type).map(String::from),
            action: axis(&self.action).map(String::from),
            user_id: None,
            from: axis(&self.date_from).and_then(|raw| parse_bound(raw, viewer, Bound::Start)),
            to: axis(&self.date_to).and_then(|raw| parse_bound(raw, viewer, Bound::End)),
        }
    }

    fn search_term(&self) -> Option<String> {
        axis(&self.search).map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

fn parse_bound(raw: &str, viewer: &ViewerContext, bound: Bound) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let boundary = &viewer.day_boundary;
        let at = match bound {
            Bound::Start => boundary.start_of_day(date),
            Bound::End => boundary.end_of_day(date),
        };
        if at.is_none() {
            debug!(value = raw, "Ignoring out-of-range date bound");
        }
        return at;
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(at) => Some(at.with_timezone(&Utc)),
        Err(_) => {
            debug!(value = raw, "Ignoring unparsable date bound");
            None
        }
    }
}

fn matches_search(entry: &HistoryEntry, term: &str) -> bool {
    [
        entry.entity_name.as_deref(),
        Some(entry.action.as_str()),
        entry.user_name.as_deref(),
        Some(entry.entity_type.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(term))
}

/// Entries that share one calendar day in the viewer's zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryGroup {
    pub date: NaiveDate,
    pub count: usize,
    /// Newest first; same-instant entries in id order.
    pub entries: Vec<HistoryEntry>,
}

/// Grouped query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupedHistory {
    /// Groups in descending date order.
    pub groups: Vec<HistoryGroup>,
    /// Number of entries across all groups.
    pub total: usize,
}

impl GroupedHistory {
    /// Iterate over every entry in display order.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Sort entries canonically and bucket them by calendar day.
pub fn group_entries(mut entries: Vec<HistoryEntry>, viewer: &ViewerContext) -> GroupedHistory {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

    let total = entries.len();
    let mut by_day: BTreeMap<NaiveDate, Vec<HistoryEntry>> = BTreeMap::new();
    for entry in entries {
        by_day
            .entry(viewer.day_boundary.date_of(&entry.created_at))
            .or_default()
            .push(entry);
    }

    let groups = by_day
        .into_iter()
        .rev()
        .map(|(date, entries)| HistoryGroup {
            date,
            count: entries.len(),
            entries,
        })
        .collect();

    GroupedHistory { groups, total }
}

/// Filters, searches, and groups history entries.
#[derive(Clone)]
pub struct HistoryQueryEngine {
    store: Arc<dyn HistoryStore>,
}

impl std::fmt::Debug for HistoryQueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryQueryEngine").finish_non_exhaustive()
    }
}

impl HistoryQueryEngine {
    /// Creates a new query engine.
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Run a query and group the result by calendar day.
    pub async fn find(&self, criteria: &HistoryCriteria, viewer: &ViewerContext) -> AppResult<GroupedHistory> {
        let filter = criteria.to_filter(viewer);
        let mut entries = self.store.query(&filter).await?;
        let fetched = entries.len();

        if let Some(term) = criteria.search_term() {
            entries.retain(|entry| matches_search(entry, &term));
        }

        let grouped = group_entries(entries, viewer);
        debug!(
            fetched,
            matched = grouped.total,
            groups = grouped.groups.len(),
            "History query grouped"
        );
        Ok(grouped)
    }

    /// Distinct entity types and actions across the whole store.
    pub async fn filter_options(&self) -> AppResult<FilterOptions> {
        self.store.filter_options().await
    }

    /// One object's history, grouped like [`find`](Self::find).
    pub async fn entity_timeline(
        &self,
        entity_type: &str,
        entity_id: &str,
        viewer: &ViewerContext,
    ) -> AppResult<GroupedHistory> {
        let entries = self.store.find_by_entity(entity_type, entity_id).await?;
        Ok(group_entries(entries, viewer))
    }

    /// A single entry for the detail view.
    pub async fn entry(&self, id: i64) -> AppResult<HistoryEntry> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("History entry {id} not found")))
    }

    /// Entries from the last `days` days, newest first.
    pub async fn recent(&self, days: u32) -> AppResult<Vec<HistoryEntry>> {
        let since = Utc::now() - Duration::days(i64::from(days));
        let mut entries = self.store.query(&HistoryFilter::all().since(since)).await?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(entries)
    }
}
