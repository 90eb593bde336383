//! Core Database Backend Traits
//!
//! This module defines the storage primitive ([`DatabaseValue`]), the flat
//! row shape returned by the store ([`StorageRow`]) and the traits the
//! adapter talks to. The caller owns the underlying connection pool and
//! injects it wrapped in one of the [`DatabasePool`] implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value as JsonValue;

use crate::error::DatastoreResult;

/// A flat mapping of column name to storage scalar
pub type StorageRow = HashMap<String, DatabaseValue>;

/// Injected connection pool the adapter issues its statements against
#[async_trait]
pub trait DatabasePool: Send + Sync {
    /// SQL dialect spoken by this pool
    fn sql_dialect(&self) -> SqlDialect;

    /// Execute a statement and return affected rows count
    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<u64>;

    /// Execute a query and return all result rows
    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<Vec<StorageRow>>;

    /// Execute a query and return the first result row, if any
    async fn fetch_optional(&self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<Option<StorageRow>>;

    /// Begin a transaction on a connection from the pool
    async fn begin_transaction(&self) -> DatastoreResult<Box<dyn DatabaseTransaction>>;
}

/// Explicit transaction handle
#[async_trait]
pub trait DatabaseTransaction: Send {
    /// Execute a statement within the transaction
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<u64>;

    /// Commit the transaction
    async fn commit(self: Box<Self>) -> DatastoreResult<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> DatastoreResult<()>;
}

/// Database value enumeration for type-safe parameter binding
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Json(JsonValue),
}

impl DatabaseValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Name of the runtime kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            DatabaseValue::Null => "null",
            DatabaseValue::Bool(_) => "boolean",
            DatabaseValue::Int64(_) => "integer",
            DatabaseValue::Float64(_) => "float",
            DatabaseValue::String(_) => "string",
            DatabaseValue::Bytes(_) => "bytes",
            DatabaseValue::Uuid(_) => "uuid",
            DatabaseValue::DateTime(_) => "datetime",
            DatabaseValue::Date(_) => "date",
            DatabaseValue::Json(_) => "json",
        }
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int64(i) => JsonValue::Number(serde_json::Number::from(*i)),
            DatabaseValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::Bytes(b) => JsonValue::Array(
                b.iter()
                    .map(|&x| JsonValue::Number(serde_json::Number::from(x)))
                    .collect(),
            ),
            DatabaseValue::Uuid(u) => JsonValue::String(u.to_string()),
            DatabaseValue::DateTime(dt) => JsonValue::String(to_iso_string(dt)),
            DatabaseValue::Date(d) => JsonValue::String(d.to_string()),
            DatabaseValue::Json(j) => j.clone(),
        }
    }

}

/// Normalized ISO-8601 rendering (millisecond precision, `Z` suffix)
pub fn to_iso_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Bool(value)
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Int64(value)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float64(value)
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::String(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::String(value.to_string())
    }
}

impl From<uuid::Uuid> for DatabaseValue {
    fn from(value: uuid::Uuid) -> Self {
        DatabaseValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for DatabaseValue {
    fn from(value: DateTime<Utc>) -> Self {
        DatabaseValue::DateTime(value)
    }
}

/// SQL dialect enumeration for generating database-specific SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    PostgreSQL,
    SQLite,
}

impl SqlDialect {
    /// Get the parameter placeholder for the zero-based parameter `index`
    pub fn parameter_placeholder(&self, index: usize) -> String {
        match self {
            SqlDialect::PostgreSQL => format!("${}", index + 1),
            SqlDialect::SQLite => "?".to_string(),
        }
    }

    /// Get the quote character for identifiers in this dialect
    pub fn identifier_quote(&self) -> char {
        '"'
    }

    /// Operator for case-insensitive pattern matching
    pub fn case_insensitive_like(&self) -> &'static str {
        match self {
            SqlDialect::PostgreSQL => "ILIKE",
            // SQLite's LIKE already ignores ASCII case
            SqlDialect::SQLite => "LIKE",
        }
    }

    /// LIMIT clause to emit when only an OFFSET was requested
    pub fn unbounded_limit(&self) -> Option<&'static str> {
        match self {
            SqlDialect::PostgreSQL => None,
            SqlDialect::SQLite => Some("LIMIT -1"),
        }
    }
}
