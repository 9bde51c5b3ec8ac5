//! History view configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::DayBoundary;

/// Settings for how history is grouped for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Default time zone for calendar-day grouping: `"local"`, `"utc"`,
    /// or a fixed offset such as `"+05:30"`.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl HistoryConfig {
    /// Parse the configured time zone.
    pub fn day_boundary(&self) -> Result<DayBoundary, AppError> {
        self.time_zone.parse().map_err(|_| {
            AppError::configuration(format!(
                "Invalid history.time_zone '{}': expected \"local\", \"utc\" or an offset like \"+05:30\"",
                self.time_zone
            ))
        })
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
        }
    }
}

fn default_time_zone() -> String {
    "local".to_string()
}
