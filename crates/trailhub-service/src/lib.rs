//! # trailhub-service
//!
//! Service layer for TrailHub. The recorder writes history entries, the
//! query engine filters and groups them by calendar day, and the presenter
//! shapes the result for display.
//!
//! Services follow constructor injection: the store is provided at
//! construction time as an `Arc<dyn HistoryStore>`.

pub mod context;
pub mod history;

pub use context::ViewerContext;
pub use history::presenter::{
    PresentedDetail, PresentedFilterOptions, PresentedGroup, present_detail,
    present_filter_options, present_groups,
};
pub use history::{
    GroupedHistory, HistoryCriteria, HistoryGroup, HistoryQueryEngine, HistoryRecorder,
    RecordChanges, RecordHistory,
};
