//! Viewer context carrying the time zone a reader sees history in.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use trailhub_core::types::DayBoundary;

/// Context for the current reader.
///
/// Passed into query and presentation calls so that day grouping and time
/// formatting never depend on ambient process state.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerContext {
    /// Where calendar days begin for this viewer.
    #[serde(serialize_with = "serialize_boundary")]
    pub day_boundary: DayBoundary,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl ViewerContext {
    /// Creates a new viewer context.
    pub fn new(day_boundary: DayBoundary) -> Self {
        Self {
            day_boundary,
            request_time: Utc::now(),
        }
    }

    /// A viewer whose days are cut in UTC.
    pub fn utc() -> Self {
        Self::new(DayBoundary::Utc)
    }

    /// Resolve a per-request zone override on top of the configured default.
    ///
    /// An unparsable override is ignored and the default applies.
    pub fn resolve(default: DayBoundary, requested: Option<&str>) -> Self {
        let boundary = match requested.map(str::trim).filter(|tz| !tz.is_empty()) {
            Some(tz) => tz.parse::<DayBoundary>().unwrap_or_else(|_| {
                debug!(tz, fallback = %default, "Ignoring unparsable time zone override");
                default
            }),
            None => default,
        };
        Self::new(boundary)
    }
}

impl Default for ViewerContext {
    fn default() -> Self {
        Self::new(DayBoundary::default())
    }
}

fn serialize_boundary<S: serde::Serializer>(
    boundary: &DayBoundary,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(boundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_when_valid() {
        let viewer = ViewerContext::resolve(DayBoundary::Local, Some("+02:00"));
        assert_eq!(viewer.day_boundary.to_string(), "+02:00");
    }

    #[test]
    fn test_invalid_or_blank_override_falls_back() {
        assert_eq!(
            ViewerContext::resolve(DayBoundary::Utc, Some("Atlantis")).day_boundary,
            DayBoundary::Utc
        );
        assert_eq!(
            ViewerContext::resolve(DayBoundary::Utc, Some("  ")).day_boundary,
            DayBoundary::Utc
        );
        assert_eq!(ViewerContext::resolve(DayBoundary::Utc, None).day_boundary, DayBoundary::Utc);
    }
}
