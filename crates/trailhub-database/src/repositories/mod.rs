//! Repository implementations for TrailHub entities.

pub mod history;

pub use history::HistoryRepository;
