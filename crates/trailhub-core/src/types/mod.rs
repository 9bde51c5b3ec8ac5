//! Core type definitions used across the TrailHub workspace.

pub mod day_boundary;
pub mod filter;
pub mod response;

pub use day_boundary::{DayBoundary, ParseDayBoundaryError};
pub use filter::HistoryFilter;
pub use response::ApiErrorResponse;
