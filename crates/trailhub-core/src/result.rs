//! Convenience result type alias for TrailHub.

use crate::error::AppError;

/// A specialized `Result` type for TrailHub operations.
pub type AppResult<T> = Result<T, AppError>;
