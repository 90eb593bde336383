//! SQLite Backend Implementation
//!
//! SQLite stores values with dynamic typing, so rows are converted by the
//! runtime type of each value rather than the declared column type.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Pool, Row, Sqlite, TypeInfo, ValueRef};

use super::core::*;
use crate::error::DatastoreResult;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// SQLite connection pool implementation
#[derive(Debug, Clone)]
pub struct SqlitePool {
    pool: Pool<Sqlite>,
}

impl SqlitePool {
    /// Wrap a caller-owned pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl DatabasePool for SqlitePool {
    fn sql_dialect(&self) -> SqlDialect {
        SqlDialect::SQLite
    }

    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<u64> {
        let result = bind_all(sqlx::query(sql), params).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<Vec<StorageRow>> {
        let rows = bind_all(sqlx::query(sql), params).fetch_all(&self.pool).await?;
        rows.iter().map(sqlite_row_to_storage_row).collect()
    }

    async fn fetch_optional(&self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<Option<StorageRow>> {
        let row = bind_all(sqlx::query(sql), params)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(sqlite_row_to_storage_row).transpose()
    }

    async fn begin_transaction(&self) -> DatastoreResult<Box<dyn DatabaseTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTransaction { tx }))
    }
}

/// SQLite transaction implementation
pub struct SqliteTransaction {
    tx: sqlx::Transaction<'static, Sqlite>,
}

#[async_trait]
impl DatabaseTransaction for SqliteTransaction {
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<u64> {
        let result = bind_all(sqlx::query(sql), params).execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> DatastoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DatastoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

fn bind_all<'q>(mut query: SqliteQuery<'q>, params: &[DatabaseValue]) -> SqliteQuery<'q> {
    for param in params {
        query = bind_database_value(query, param);
    }
    query
}

/// Bind a DatabaseValue to a sqlx query. UUIDs and JSON are stored as text.
fn bind_database_value<'q>(query: SqliteQuery<'q>, value: &DatabaseValue) -> SqliteQuery<'q> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::Uuid(u) => query.bind(u.to_string()),
        DatabaseValue::DateTime(dt) => query.bind(*dt),
        DatabaseValue::Date(d) => query.bind(*d),
        DatabaseValue::Json(j) => query.bind(j.to_string()),
    }
}

fn sqlite_row_to_storage_row(row: &SqliteRow) -> DatastoreResult<StorageRow> {
    let mut map = StorageRow::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        map.insert(
            column.name().to_string(),
            sqlite_value_to_database_value(row, index)?,
        );
    }
    Ok(map)
}

fn sqlite_value_to_database_value(row: &SqliteRow, index: usize) -> DatastoreResult<DatabaseValue> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(DatabaseValue::Null);
    }
    let type_name = raw.type_info().name().to_string();

    let value = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => DatabaseValue::Int64(row.try_get_unchecked(index)?),
        "REAL" | "NUMERIC" => DatabaseValue::Float64(row.try_get_unchecked(index)?),
        "BLOB" => DatabaseValue::Bytes(row.try_get_unchecked(index)?),
        _ => DatabaseValue::String(row.try_get_unchecked(index)?),
    };
    Ok(value)
}
