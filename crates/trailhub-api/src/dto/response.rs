//! Response DTOs.

use serde::{Deserialize, Serialize};

use trailhub_core::types::ApiErrorResponse;
use trailhub_service::PresentedGroup;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A degraded response: empty data plus the error that caused it.
#[derive(Debug, Clone, Serialize)]
pub struct ApiFailure<T: Serialize> {
    /// Always `false`.
    pub success: bool,
    /// Empty data of the shape the caller expected.
    pub data: T,
    /// What went wrong.
    pub error: ApiErrorResponse,
}

impl<T: Serialize> ApiFailure<T> {
    pub fn new(data: T, error: ApiErrorResponse) -> Self {
        Self {
            success: false,
            data,
            error,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// `connected` or `unavailable`.
    pub database: String,
}

/// Response to a successful record call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedResponse {
    /// Id assigned to the new entry.
    pub id: i64,
}

/// Grouped history list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryListResponse {
    pub groups: Vec<PresentedGroup>,
    pub total: usize,
    pub has_active_filters: bool,
}
