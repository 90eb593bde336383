//! PostgreSQL Backend Implementation
//!
//! This module provides the PostgreSQL-specific implementation of the database
//! backend traits using sqlx as the underlying database driver.

use async_trait::async_trait;
use chrono::TimeZone;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Column, Pool, Postgres, Row, TypeInfo, ValueRef};

use super::core::*;
use crate::error::DatastoreResult;

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// PostgreSQL connection pool implementation
#[derive(Debug, Clone)]
pub struct PostgresPool {
    pool: Pool<Postgres>,
}

impl PostgresPool {
    /// Wrap a caller-owned pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl DatabasePool for PostgresPool {
    fn sql_dialect(&self) -> SqlDialect {
        SqlDialect::PostgreSQL
    }

    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<u64> {
        let result = bind_all(sqlx::query(sql), params).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<Vec<StorageRow>> {
        let rows = bind_all(sqlx::query(sql), params).fetch_all(&self.pool).await?;
        rows.iter().map(postgres_row_to_storage_row).collect()
    }

    async fn fetch_optional(&self, sql: &str, params: &[DatabaseValue]) -> DatastoreResult<Option<StorageRow>> {
        let row = bind_all(sqlx::query(sql), params)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(postgres_row_to_storage_row).transpose()
    }

    async fn begin_transaction(&self) -> DatastoreResult<Box<dyn DatabaseTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

/// PostgreSQL transaction implementation
pub struct PostgresTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl DatabaseTransaction for PostgresTransaction {
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

fn bind_all<'q>(mut query: PgQuery<'q>, params: &[DatabaseValue]) -> PgQuery<'q> {
    for param in params {
        query = bind_database_value(query, param);
    }
    query
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'q>(query: PgQuery<'q>, value: &DatabaseValue) -> PgQuery<'q> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::Uuid(u) => query.bind(*u),
        DatabaseValue::DateTime(dt) => query.bind(*dt),
        DatabaseValue::Date(d) => query.bind(*d),
        DatabaseValue::Json(j) => query.bind(sqlx::types::Json(j.clone())),
    }
}

fn postgres_row_to_storage_row(row: &PgRow) -> DatastoreResult<StorageRow> {
    let mut map = StorageRow::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        map.insert(
            column.name().to_string(),
            postgres_value_to_database_value(row, index)?,
        );
    }
    Ok(map)
}

/// Convert a PostgreSQL column value to DatabaseValue
fn postgres_value_to_database_value(row: &PgRow, index: usize) -> DatastoreResult<DatabaseValue> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(DatabaseValue::Null);
    }

    let type_name = row.columns()[index].type_info().name().to_string();
    let value = match type_name.as_str() {
        "BOOL" => DatabaseValue::Bool(row.try_get(index)?),
        "INT2" => DatabaseValue::Int64(row.try_get::<i16, _>(index)? as i64),
        "INT4" => DatabaseValue::Int64(row.try_get::<i32, _>(index)? as i64),
        "INT8" => DatabaseValue::Int64(row.try_get(index)?),
        "FLOAT4" => DatabaseValue::Float64(row.try_get::<f32, _>(index)? as f64),
        "FLOAT8" => DatabaseValue::Float64(row.try_get(index)?),
        "BYTEA" => DatabaseValue::Bytes(row.try_get(index)?),
        "UUID" => DatabaseValue::Uuid(row.try_get(index)?),
        "TIMESTAMPTZ" => DatabaseValue::DateTime(row.try_get(index)?),
        "TIMESTAMP" => {
            let naive: chrono::NaiveDateTime = row.try_get(index)?;
            DatabaseValue::DateTime(chrono::Utc.from_utc_datetime(&naive))
        }
        "DATE" => DatabaseValue::Date(row.try_get(index)?),
        "JSON" | "JSONB" => DatabaseValue::Json(row.try_get::<JsonValue, _>(index)?),
        // TEXT, VARCHAR, BPCHAR, NAME and anything else readable as text
        _ => DatabaseValue::String(row.try_get(index)?),
    };
    Ok(value)
}
