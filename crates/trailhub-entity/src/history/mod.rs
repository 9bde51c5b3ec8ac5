//! History entry models and the change payload codec.

pub mod action;
pub mod changes;
pub mod model;

pub use action::ActionKind;
pub use changes::{ChangePayload, FieldChange, UNKNOWN_VALUE};
pub use model::{FilterOptions, HistoryEntry, NewHistoryEntry};
