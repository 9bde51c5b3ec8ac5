//! Display shaping for grouped history and single entries.
//!
//! List views never decode change payloads; only [`present_detail`] does.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use trailhub_entity::history::{ActionKind, ChangePayload, FilterOptions, HistoryEntry};

use super::query::{GroupedHistory, HistoryGroup};
use crate::context::ViewerContext;

/// Icon and color used to render an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionStyle {
    pub icon: &'static str,
    pub color: &'static str,
}

/// The style for an action kind.
pub fn action_style(kind: ActionKind) -> ActionStyle {
    let (icon, color) = match kind {
        ActionKind::Create => ("plus", "green"),
        ActionKind::Update => ("file-edit", "blue"),
        ActionKind::Delete => ("trash-2", "red"),
        ActionKind::Cancel => ("x", "orange"),
        ActionKind::Revision => ("rotate-ccw", "purple"),
    };
    ActionStyle { icon, color }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedEntry {
    pub id: i64,
    pub title: String,
    pub entity_type: String,
    pub entity_id: String,
    pub action: String,
    pub action_label: String,
    pub icon: &'static str,
    pub color: &'static str,
    /// Wall-clock time in the viewer's zone, e.g. `3:04 PM`.
    pub time: String,
    pub user_name: Option<String>,
    pub has_changes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedGroup {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// e.g. `Thursday, May 2, 2024`.
    pub heading: String,
    pub count: usize,
    /// e.g. `2 changes`.
    pub count_label: String,
    pub entries: Vec<PresentedEntry>,
}

/// One decoded field change. `from` is `None` for additions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedChange {
    pub field: String,
    pub from: Option<String>,
    pub to: String,
    pub is_addition: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedDetail {
    pub id: i64,
    pub title: String,
    pub entity_type: String,
    pub entity_id: String,
    pub action: String,
    pub action_label: String,
    pub icon: &'static str,
    pub color: &'static str,
    /// e.g. `May 2, 2024, 3:04:05 PM`.
    pub timestamp: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub changes: Vec<PresentedChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresentedFilterOptions {
    pub entity_types: Vec<FilterOption>,
    pub actions: Vec<FilterOption>,
}

/// Uppercase the first character.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn count_label(count: usize) -> String {
    if count == 1 {
        "1 change".to_string()
    } else {
        format!("{count} changes")
    }
}

fn present_entry(entry: &HistoryEntry, viewer: &ViewerContext) -> PresentedEntry {
    let style = action_style(entry.action_kind());
    PresentedEntry {
        id: entry.id,
        title: entry.display_name(),
        entity_type: entry.entity_type.clone(),
        entity_id: entry.entity_id.clone(),
        action: entry.action.clone(),
        action_label: capitalize(&entry.action),
        icon: style.icon,
        color: style.color,
        time: viewer
            .day_boundary
            .local_datetime(&entry.created_at)
            .format("%-I:%M %p")
            .to_string(),
        user_name: entry.user_name.clone(),
        has_changes: entry.has_changes(),
    }
}

fn present_group(group: &HistoryGroup, viewer: &ViewerContext) -> PresentedGroup {
    PresentedGroup {
        date: group.date.format("%Y-%m-%d").to_string(),
        heading: group.date.format("%A, %B %-d, %Y").to_string(),
        count: group.count,
        count_label: count_label(group.count),
        entries: group.entries.iter().map(|e| present_entry(e, viewer)).collect(),
    }
}

/// Shape grouped history for a list view.
pub fn present_groups(grouped: &GroupedHistory, viewer: &ViewerContext) -> Vec<PresentedGroup> {
    grouped.groups.iter().map(|g| present_group(g, viewer)).collect()
}

/// Shape one entry for the detail view, decoding its change payload.
pub fn present_detail(entry: &HistoryEntry, viewer: &ViewerContext) -> PresentedDetail {
    let payload = entry.changes.as_deref().and_then(ChangePayload::detect);
    if payload.as_ref().is_some_and(ChangePayload::is_raw_text) {
        debug!(id = entry.id, "Change payload is unstructured, showing as details");
    }

    let changes = payload
        .map(ChangePayload::into_changes)
        .unwrap_or_default()
        .into_iter()
        .map(|change| {
            let is_addition = change.is_addition();
            PresentedChange {
                field: change.field,
                from: (!is_addition).then_some(change.from),
                to: change.to,
                is_addition,
            }
        })
        .collect();

    let style = action_style(entry.action_kind());
    PresentedDetail {
        id: entry.id,
        title: entry.display_name(),
        entity_type: entry.entity_type.clone(),
        entity_id: entry.entity_id.clone(),
        action: entry.action.clone(),
        action_label: capitalize(&entry.action),
        icon: style.icon,
        color: style.color,
        timestamp: viewer
            .day_boundary
            .local_datetime(&entry.created_at)
            .format("%B %-d, %Y, %-I:%M:%S %p")
            .to_string(),
        created_at: entry.created_at,
        user_id: entry.user_id.clone(),
        user_name: entry.user_name.clone(),
        changes,
    }
}

fn filter_values(values: &[String]) -> Vec<FilterOption> {
    values
        .iter()
        .map(|value| FilterOption {
            value: value.clone(),
            label: capitalize(value),
        })
        .collect()
}

/// Value/label pairs for filter controls.
pub fn present_filter_options(options: &FilterOptions) -> PresentedFilterOptions {
    PresentedFilterOptions {
        entity_types: filter_values(&options.entity_types),
        actions: filter_values(&options.actions),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use trailhub_entity::history::NewHistoryEntry;

    use super::*;
    use crate::history::query::group_entries;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 15, 4, 5).unwrap()
    }

    fn entry(id: i64, action: &str, changes: Option<&str>) -> HistoryEntry {
        let mut new = NewHistoryEntry::new("invoice", "42", action).named("INV-42").by("u1", "Alice");
        new.changes = changes.map(String::from);
        new.into_entry(id, at())
    }

    #[test]
    fn test_action_styles() {
        assert_eq!(action_style(ActionKind::Create), ActionStyle { icon: "plus", color: "green" });
        assert_eq!(action_style(ActionKind::Delete).icon, "trash-2");
        assert_eq!(action_style(ActionKind::Revision).color, "purple");
    }

    #[test]
    fn test_unknown_action_renders_as_update() {
        let presented = present_entry(&entry(1, "archive", None), &ViewerContext::utc());
        assert_eq!(presented.icon, "file-edit");
        assert_eq!(presented.color, "blue");
        assert_eq!(presented.action_label, "Archive");
    }

    #[test]
    fn test_group_headings_and_labels() {
        let entries = vec![
            entry(1, "create", None),
            entry(2, "update", Some(r#"{"status":"paid"}"#)),
            {
                let mut e = entry(3, "delete", None);
                e.created_at = at() + Duration::days(1);
                e
            },
        ];
        let viewer = ViewerContext::utc();
        let groups = present_groups(&group_entries(entries, &viewer), &viewer);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, "2024-05-03");
        assert_eq!(groups[0].count_label, "1 change");
        assert_eq!(groups[1].heading, "Thursday, May 2, 2024");
        assert_eq!(groups[1].count_label, "2 changes");
        assert_eq!(groups[1].entries[0].time, "3:04 PM");
        assert!(!groups[1].entries[0].has_changes);
        assert!(groups[1].entries[1].has_changes);
    }

    #[test]
    fn test_detail_decodes_changes() {
        let raw = r#"[{"field":"status","from":"draft","to":"paid"},{"field":"note","from":"<unknown>","to":"hi"}]"#;
        let detail = present_detail(&entry(7, "update", Some(raw)), &ViewerContext::utc());

        assert_eq!(detail.timestamp, "May 2, 2024, 3:04:05 PM");
        assert_eq!(detail.title, "INV-42");
        assert_eq!(
            detail.changes,
            vec![
                PresentedChange {
                    field: "status".into(),
                    from: Some("draft".into()),
                    to: "paid".into(),
                    is_addition: false,
                },
                PresentedChange {
                    field: "note".into(),
                    from: None,
                    to: "hi".into(),
                    is_addition: true,
                },
            ]
        );
    }

    #[test]
    fn test_detail_of_free_text_and_empty_payloads() {
        let viewer = ViewerContext::utc();
        let text = present_detail(&entry(1, "cancel", Some("voided by finance")), &viewer);
        assert_eq!(text.changes.len(), 1);
        assert_eq!(text.changes[0].field, "details");
        assert!(text.changes[0].is_addition);

        let empty = present_detail(&entry(2, "create", None), &viewer);
        assert!(empty.changes.is_empty());
    }

    #[test]
    fn test_detail_time_uses_viewer_zone() {
        let viewer = ViewerContext::new("-08:00".parse().unwrap());
        let detail = present_detail(&entry(1, "create", None), &viewer);
        assert_eq!(detail.timestamp, "May 2, 2024, 7:04:05 AM");
    }

    #[test]
    fn test_filter_option_labels() {
        let options = FilterOptions {
            entity_types: vec!["invoice".into(), "purchase_order".into()],
            actions: vec!["create".into()],
        };
        let presented = present_filter_options(&options);
        assert_eq!(presented.entity_types[0].label, "Invoice");
        assert_eq!(presented.entity_types[1].value, "purchase_order");
        assert_eq!(presented.actions[0].label, "Create");
        assert_eq!(capitalize(""), "");
    }
}
