//! Change payload codec.
//!
//! The `changes` column has been written in three shapes over time:
//!
//! - a JSON list of `{field, from, to}` objects (current format),
//! - a JSON object mapping field names to new values (legacy, no `from`),
//! - free text (legacy, not JSON at all).
//!
//! [`ChangePayload::detect`] resolves which shape a stored payload has, and
//! [`ChangePayload::decode`] turns any payload into a list of
//! [`FieldChange`]s. Decoding never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder `from` value for changes whose previous value was not recorded.
pub const UNKNOWN_VALUE: &str = "<unknown>";

/// Field name used for payloads that carry no structure.
pub const DETAILS_FIELD: &str = "details";

/// One field-level change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Name of the changed field.
    pub field: String,
    /// Previous value, or [`UNKNOWN_VALUE`].
    pub from: String,
    /// New value.
    pub to: String,
}

impl FieldChange {
    /// A before/after change.
    pub fn new(field: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// A change with no recorded previous value.
    pub fn added(field: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(field, UNKNOWN_VALUE, to)
    }

    /// Whether this renders as an addition rather than a before/after diff.
    pub fn is_addition(&self) -> bool {
        self.from == UNKNOWN_VALUE
    }
}

/// A stored change payload, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangePayload {
    /// Canonical list of field changes.
    DiffList(Vec<FieldChange>),
    /// Legacy `field -> new value` mapping, in document order.
    LegacyMapping(Vec<(String, String)>),
    /// Unstructured text.
    RawText(String),
}

impl ChangePayload {
    /// Classify a raw payload. Returns `None` for empty or blank input.
    pub fn detect(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        let payload = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => Self::DiffList(items.into_iter().map(element_change).collect()),
            Ok(Value::Object(map)) => Self::LegacyMapping(
                map.into_iter()
                    .map(|(field, value)| (field, value_text(value)))
                    .collect(),
            ),
            // Bare scalars and non-JSON text both keep the original text.
            Ok(_) | Err(_) => Self::RawText(raw.to_string()),
        };
        Some(payload)
    }

    /// Decode an optional raw payload into field changes.
    pub fn decode(raw: Option<&str>) -> Vec<FieldChange> {
        raw.and_then(Self::detect)
            .map(Self::into_changes)
            .unwrap_or_default()
    }

    /// Flatten into field changes.
    pub fn into_changes(self) -> Vec<FieldChange> {
        match self {
            Self::DiffList(changes) => changes,
            Self::LegacyMapping(pairs) => pairs
                .into_iter()
                .map(|(field, to)| FieldChange::added(field, to))
                .collect(),
            Self::RawText(text) => vec![FieldChange::added(DETAILS_FIELD, text)],
        }
    }

    /// Encode canonical field changes for storage.
    pub fn encode(changes: &[FieldChange]) -> String {
        serde_json::to_string(changes).unwrap_or_else(|_| "[]".to_string())
    }

    /// Serialize this payload in its own shape.
    pub fn to_raw(&self) -> String {
        match self {
            Self::DiffList(changes) => Self::encode(changes),
            Self::LegacyMapping(pairs) => {
                let map: serde_json::Map<String, Value> = pairs
                    .iter()
                    .map(|(field, value)| (field.clone(), Value::String(value.clone())))
                    .collect();
                Value::Object(map).to_string()
            }
            Self::RawText(text) => text.clone(),
        }
    }

    /// Whether detection fell through to unstructured text.
    pub fn is_raw_text(&self) -> bool {
        matches!(self, Self::RawText(_))
    }
}

fn element_change(item: Value) -> FieldChange {
    match item {
        Value::Object(mut map) if map.contains_key("field") => {
            let field = map.remove("field").map(value_text).unwrap_or_default();
            let from = map
                .remove("from")
                .map(value_text)
                .unwrap_or_else(|| UNKNOWN_VALUE.to_string());
            let to = map.remove("to").map(value_text).unwrap_or_default();
            FieldChange { field, from, to }
        }
        other => FieldChange::added(DETAILS_FIELD, value_text(other)),
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
