//! History services: recording, querying, and presentation.

pub mod presenter;
pub mod query;
pub mod recorder;

pub use query::{GroupedHistory, HistoryCriteria, HistoryGroup, HistoryQueryEngine};
pub use recorder::{HistoryRecorder, RecordChanges, RecordHistory};
