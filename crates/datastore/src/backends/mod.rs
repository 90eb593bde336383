//! Database Backend Abstractions
//!
//! The adapter speaks to the store only through [`DatabasePool`]. PostgreSQL
//! and SQLite implementations wrap a caller-owned sqlx pool.

pub mod core;
pub mod postgres;
pub mod sqlite;

// Re-export core traits and types
pub use core::*;
pub use postgres::PostgresPool;
pub use sqlite::SqlitePool;
