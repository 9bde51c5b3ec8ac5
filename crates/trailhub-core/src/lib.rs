//! # trailhub-core
//!
//! Core crate for TrailHub. Contains configuration schemas, the history
//! filter and day-boundary types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TrailHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
