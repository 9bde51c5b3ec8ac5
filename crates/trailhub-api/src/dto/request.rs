//! Request DTOs with validation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use trailhub_core::error::AppError;
use trailhub_service::{HistoryCriteria, RecordChanges, RecordHistory};

/// Record-history request body.
///
/// Required strings default to empty so that a missing field surfaces as a
/// validation error rather than a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordHistoryRequest {
    /// Kind of business object.
    #[serde(default, alias = "entityType")]
    #[validate(length(min = 1, max = 100, message = "entity_type is required"))]
    pub entity_type: String,
    /// Object identifier; numbers are accepted and stored as text.
    #[serde(default, alias = "entityId", deserialize_with = "string_or_number")]
    #[validate(length(min = 1, max = 255, message = "entity_id is required"))]
    pub entity_id: String,
    /// Display label.
    #[serde(default, alias = "entityName")]
    pub entity_name: Option<String>,
    /// Action performed.
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "action is required"))]
    pub action: String,
    /// Changes as a diff list, a field mapping, or a string.
    #[serde(default)]
    pub changes: Option<Value>,
    /// Actor identifier; numbers are accepted and stored as text.
    #[serde(default, alias = "userId", deserialize_with = "optional_string_or_number")]
    pub user_id: Option<String>,
    /// Actor display name.
    #[serde(default, alias = "userName")]
    pub user_name: Option<String>,
}

impl RecordHistoryRequest {
    /// Validate and convert into a service request.
    pub fn into_record(self) -> Result<RecordHistory, AppError> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Validation failed: {e}")))?;

        Ok(RecordHistory {
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            entity_name: self.entity_name,
            action: self.action,
            changes: self.changes.and_then(RecordChanges::from_json),
            user_id: self.user_id,
            user_name: self.user_name,
        })
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Zone override accepted by every read endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerParams {
    /// `local`, `utc`, or a fixed offset such as `+05:30`.
    #[serde(default, alias = "timezone")]
    pub tz: Option<String>,
}

/// Query string for `GET /api/history`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQueryParams {
    /// Free-text search.
    #[serde(default)]
    pub search: Option<String>,
    /// Entity type, or `all`.
    #[serde(default, alias = "entityType")]
    pub entity_type: Option<String>,
    /// Action, or `all`.
    #[serde(default)]
    pub action: Option<String>,
    /// Lower date bound.
    #[serde(default, alias = "dateFrom", alias = "date_from")]
    pub from: Option<String>,
    /// Upper date bound.
    #[serde(default, alias = "dateTo", alias = "date_to")]
    pub to: Option<String>,
    /// Viewer zone override.
    #[serde(default, alias = "timezone")]
    pub tz: Option<String>,
}

impl HistoryQueryParams {
    /// The engine criteria for these parameters.
    pub fn criteria(&self) -> HistoryCriteria {
        HistoryCriteria {
            search: self.search.clone(),
            entity_type: self.entity_type.clone(),
            action: self.action.clone(),
            date_from: self.from.clone(),
            date_to: self.to.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailhub_core::error::ErrorKind;

    #[test]
    fn test_missing_fields_are_validation_errors() {
        let request: RecordHistoryRequest =
            serde_json::from_value(serde_json::json!({ "entity_type": "invoice" })).unwrap();
        let err = request.into_record().expect_err("should fail");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("entity_id"));
    }

    #[test]
    fn test_numeric_ids_and_camel_case_are_accepted() {
        let request: RecordHistoryRequest = serde_json::from_value(serde_json::json!({
            "entityType": "invoice",
            "entityId": 42,
            "action": "update",
            "userId": 7,
            "changes": { "status": "paid" }
        }))
        .unwrap();
        let record = request.into_record().expect("valid");
        assert_eq!(record.entity_id, "42");
        assert_eq!(record.user_id.as_deref(), Some("7"));
        assert_eq!(
            record.changes,
            Some(RecordChanges::Mapping(vec![("status".into(), "paid".into())]))
        );
    }

    #[test]
    fn test_query_params_map_to_criteria() {
        let params = HistoryQueryParams {
            entity_type: Some("invoice".into()),
            from: Some("2024-05-01".into()),
            ..Default::default()
        };
        let criteria = params.criteria();
        assert_eq!(criteria.entity_type.as_deref(), Some("invoice"));
        assert_eq!(criteria.date_from.as_deref(), Some("2024-05-01"));
        assert!(criteria.search.is_none());
    }
}
