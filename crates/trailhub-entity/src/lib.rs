//! # trailhub-entity
//!
//! Domain models for TrailHub. [`history::HistoryEntry`] is the stored
//! audit row; [`history::ChangePayload`] decodes its opaque `changes` text
//! into field-level diffs.

pub mod history;
