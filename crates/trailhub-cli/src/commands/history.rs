//! History CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use trailhub_core::error::AppError;
use trailhub_database::{HistoryRepository, HistoryStore};
use trailhub_service::history::presenter::{PresentedChange, PresentedEntry};
use trailhub_service::{
    HistoryCriteria, HistoryQueryEngine, HistoryRecorder, RecordChanges, RecordHistory,
    ViewerContext, present_detail, present_filter_options, present_groups,
};

use crate::output::{self, OutputFormat};

/// Arguments for history commands
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// History subcommand
    #[command(subcommand)]
    pub command: HistoryCommand,
}

/// History subcommands
#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// Record a history entry
    Record {
        /// Kind of business object (e.g. invoice)
        #[arg(long)]
        entity_type: String,
        /// Object identifier
        #[arg(long)]
        entity_id: String,
        /// Action performed (create, update, delete, cancel, revision)
        #[arg(short, long)]
        action: String,
        /// Display label of the object
        #[arg(short, long)]
        name: Option<String>,
        /// Changes as a JSON diff list, a JSON field mapping, or free text
        #[arg(long)]
        changes: Option<String>,
        /// Actor identifier
        #[arg(long)]
        user_id: Option<String>,
        /// Actor display name
        #[arg(long)]
        user_name: Option<String>,
    },
    /// Search history grouped by day
    Search {
        /// Free-text search over name, action, actor, and type
        #[arg(short, long)]
        search: Option<String>,
        /// Filter by entity type
        #[arg(long)]
        entity_type: Option<String>,
        /// Filter by action
        #[arg(short, long)]
        action: Option<String>,
        /// Lower bound (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: Option<String>,
        /// Upper bound (YYYY-MM-DD includes that day)
        #[arg(long)]
        to: Option<String>,
        /// Day boundary override (local, utc, +05:30)
        #[arg(long)]
        tz: Option<String>,
    },
    /// Show one entry with its decoded changes
    Show {
        /// Entry id
        id: i64,
        /// Day boundary override
        #[arg(long)]
        tz: Option<String>,
    },
    /// Export recent history to a JSON file
    Export {
        /// Output file path
        #[arg(short, long, default_value = "history_export.json")]
        output: String,
        /// Days of history to export
        #[arg(short, long, default_value = "30")]
        days: u32,
    },
    /// List distinct entity types and actions
    Filters,
}

/// History list row
#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    /// Id
    id: i64,
    /// Time of day
    time: String,
    /// Entity label
    title: String,
    /// Action
    action: String,
    /// Actor
    user: String,
    /// Whether a change payload exists
    changes: String,
}

impl From<&PresentedEntry> for HistoryRow {
    fn from(entry: &PresentedEntry) -> Self {
        Self {
            id: entry.id,
            time: entry.time.clone(),
            title: entry.title.clone(),
            action: entry.action_label.clone(),
            user: entry.user_name.clone().unwrap_or_else(|| "system".to_string()),
            changes: if entry.has_changes { "yes" } else { "" }.to_string(),
        }
    }
}

/// Field change row
#[derive(Debug, Serialize, Tabled)]
struct ChangeRow {
    /// Field
    field: String,
    /// Previous value
    from: String,
    /// New value
    to: String,
}

impl From<&PresentedChange> for ChangeRow {
    fn from(change: &PresentedChange) -> Self {
        Self {
            field: change.field.clone(),
            from: change.from.clone().unwrap_or_else(|| "(added)".to_string()),
            to: change.to.clone(),
        }
    }
}

/// Filter value row
#[derive(Debug, Serialize, Tabled)]
struct FilterRow {
    /// Filter axis
    kind: &'static str,
    /// Stored value
    value: String,
    /// Display label
    label: String,
}

/// Execute history commands
pub async fn execute(
    args: &HistoryArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let default_boundary = config.history.day_boundary()?;
    let db = super::connect(&config).await?;

    let store: Arc<dyn HistoryStore> = Arc::new(HistoryRepository::new(db.pool().clone()));
    let recorder = HistoryRecorder::new(Arc::clone(&store));
    let engine = HistoryQueryEngine::new(store);

    match &args.command {
        HistoryCommand::Record {
            entity_type,
            entity_id,
            action,
            name,
            changes,
            user_id,
            user_name,
        } => {
            let request = RecordHistory {
                entity_type: entity_type.clone(),
                entity_id: entity_id.clone(),
                entity_name: name.clone(),
                action: action.clone(),
                changes: changes.as_deref().and_then(RecordChanges::from_raw),
                user_id: user_id.clone(),
                user_name: user_name.clone(),
            };
            let id = recorder.record(request).await?;
            output::print_success(&format!("Recorded history entry {id}"));
        }
        HistoryCommand::Search {
            search,
            entity_type,
            action,
            from,
            to,
            tz,
        } => {
            let viewer = ViewerContext::resolve(default_boundary, tz.as_deref());
            let criteria = HistoryCriteria {
                search: search.clone(),
                entity_type: entity_type.clone(),
                action: action.clone(),
                date_from: from.clone(),
                date_to: to.clone(),
            };
            let grouped = engine.find(&criteria, &viewer).await?;
            let groups = present_groups(&grouped, &viewer);

            match format {
                OutputFormat::Json => output::print_json(&groups),
                OutputFormat::Table => {
                    if groups.is_empty() {
                        println!("No results found.");
                    }
                    for group in &groups {
                        output::print_heading(&format!("{} ({})", group.heading, group.count_label));
                        let rows: Vec<HistoryRow> = group.entries.iter().map(HistoryRow::from).collect();
                        output::print_table(&rows);
                    }
                }
            }
        }
        HistoryCommand::Show { id, tz } => {
            let viewer = ViewerContext::resolve(default_boundary, tz.as_deref());
            let entry = engine.entry(*id).await?;
            let detail = present_detail(&entry, &viewer);

            match format {
                OutputFormat::Json => output::print_json(&detail),
                OutputFormat::Table => {
                    output::print_kv("Entry", &detail.id.to_string());
                    output::print_kv("Object", &detail.title);
                    output::print_kv("Type", &detail.entity_type);
                    output::print_kv("Action", &detail.action_label);
                    output::print_kv("When", &detail.timestamp);
                    output::print_kv("By", detail.user_name.as_deref().unwrap_or("system"));
                    let rows: Vec<ChangeRow> = detail.changes.iter().map(ChangeRow::from).collect();
                    if !rows.is_empty() {
                        output::print_heading("Changes");
                        output::print_table(&rows);
                    }
                }
            }
        }
        HistoryCommand::Export {
            output: out_path,
            days,
        } => {
            let entries = engine.recent(*days).await?;
            let json = serde_json::to_string_pretty(&entries)?;

            tokio::fs::write(out_path, json)
                .await
                .map_err(|e| AppError::internal(format!("Failed to write file: {e}")))?;

            output::print_success(&format!(
                "Exported {} history entries to '{out_path}'",
                entries.len()
            ));
        }
        HistoryCommand::Filters => {
            let options = present_filter_options(&engine.filter_options().await?);
            let rows: Vec<FilterRow> = options
                .entity_types
                .iter()
                .map(|o| ("entity_type", o))
                .chain(options.actions.iter().map(|o| ("action", o)))
                .map(|(kind, o)| FilterRow {
                    kind,
                    value: o.value.clone(),
                    label: o.label.clone(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    db.close().await;
    Ok(())
}
