//! # trailhub-database
//!
//! SQLite connection management, migrations, and the append-only
//! history store.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use repositories::HistoryRepository;
pub use store::HistoryStore;
