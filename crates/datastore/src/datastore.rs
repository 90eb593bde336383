//! Repository Operations - the datastore surface
//!
//! [`SqlDatastore`] persists model instances into one table per model and
//! answers searches against them. The connection pool is owned by the caller
//! and injected at construction; the datastore never opens or closes
//! connections itself.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value as JsonValue;

use crate::backends::{DatabasePool, DatabaseValue, StorageRow};
use crate::config::DatastoreConfig;
use crate::error::{DatastoreError, DatastoreResult};
use crate::model::{Model, ModelInstance, Record, TableNameResolver};
use crate::query::QueryBuilder;
use crate::search::{compile_search, OrmSearch};
use crate::serializer::ValueSerializer;

/// Decoded search results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResult {
    pub records: Vec<Record>,
    /// Offset of the next page, present when the search was paginated
    pub page: Option<u64>,
}

/// Relational datastore over an injected connection pool
#[derive(Clone)]
pub struct SqlDatastore {
    pool: Arc<dyn DatabasePool>,
    serializer: ValueSerializer,
    table_names: Arc<dyn TableNameResolver>,
    bulk_encode_concurrency: usize,
}

impl SqlDatastore {
    /// Create a datastore with the default configuration
    pub fn new(pool: Arc<dyn DatabasePool>) -> Self {
        Self::with_config(pool, DatastoreConfig::default())
    }

    pub fn with_config(pool: Arc<dyn DatabasePool>, config: DatastoreConfig) -> Self {
        Self {
            pool,
            serializer: ValueSerializer::new(config.codecs),
            table_names: config.table_names,
            bulk_encode_concurrency: config.bulk_encode_concurrency.max(1),
        }
    }

    pub fn pool(&self) -> &Arc<dyn DatabasePool> {
        &self.pool
    }

    pub fn serializer(&self) -> &ValueSerializer {
        &self.serializer
    }

    /// Table holding the records of `model`
    pub fn table_name(&self, model: &dyn Model) -> String {
        self.table_names.table_name(model)
    }

    /// Look up a record by primary key. Absence is `Ok(None)`.
    pub async fn retrieve(&self, model: &dyn Model, primary_key: &JsonValue) -> DatastoreResult<Option<Record>> {
        let table = self.table_name(model);
        let row = self.fetch_by_primary_key(model, &table, primary_key).await?;

        match row {
            Some(row) => Ok(Some(
                self.serializer
                    .to_typed_record(model.definition(), Some(&row))?,
            )),
            None => {
                tracing::debug!("No row in '{}' for key {}", table, primary_key);
                Ok(None)
            }
        }
    }

    /// Upsert an instance by primary key, then return the row as stored
    pub async fn save(&self, instance: &dyn ModelInstance) -> DatastoreResult<Record> {
        let model = instance.model();
        let definition = model.definition();
        let table = self.table_name(model);

        let record = instance.to_record().await?;
        let primary_key = instance.primary_key().await?;
        let values = self.serializer.to_storage_values(definition, &record);

        let query = QueryBuilder::new()
            .insert_into(&table)
            .columns(definition.column_names().as_slice())
            .values(values)
            .on_conflict_merge(definition.primary_key_name());
        self.execute(&query).await?;

        let row = self
            .fetch_by_primary_key(model, &table, &primary_key)
            .await?
            .ok_or_else(|| DatastoreError::NotFound {
                table: table.clone(),
                key: primary_key.to_string(),
            })?;

        tracing::debug!("Saved {} into '{}'", primary_key, table);
        self.serializer.to_typed_record(definition, Some(&row))
    }

    /// Insert a batch of instances of `model` in a single transaction.
    ///
    /// An empty batch is a no-op. Every instance must belong to `model`: a
    /// batch mixing models, or made only of instances of another model, is
    /// rejected with [`DatastoreError::HeterogeneousBatch`] before anything is
    /// written. Either every row is inserted or none is.
    pub async fn bulk_insert<I>(&self, model: &dyn Model, instances: &[I]) -> DatastoreResult<()>
    where
        I: ModelInstance,
    {
        if instances.is_empty() {
            tracing::debug!("Bulk insert into '{}' skipped: empty batch", model.name());
            return Ok(());
        }

        let mut models = vec![model.name().to_string()];
        for instance in instances {
            let name = instance.model().name();
            if !models.iter().any(|m| m == name) {
                models.push(name.to_string());
            }
        }
        if models.len() > 1 {
            return Err(DatastoreError::HeterogeneousBatch { models });
        }

        let definition = model.definition();
        let serializer = &self.serializer;
        let rows: Vec<Vec<DatabaseValue>> = stream::iter(instances)
            .map(|instance| async move {
                let record = instance.to_record().await?;
                Ok::<_, DatastoreError>(serializer.to_storage_values(definition, &record))
            })
            .buffered(self.bulk_encode_concurrency)
            .try_collect()
            .await?;

        let table = self.table_name(model);
        let row_count = rows.len();
        let query = rows.into_iter().fold(
            QueryBuilder::new()
                .insert_into(&table)
                .columns(definition.column_names().as_slice()),
            |query, row| query.values(row),
        );
        let (sql, params) = query.to_sql_with_params(self.pool.sql_dialect());
        tracing::debug!("Bulk inserting {} rows: {}", row_count, sql);

        let mut tx = self.pool.begin_transaction().await?;
        if let Err(e) = tx.execute(&sql, &params).await {
            if let Err(rollback_error) = tx.rollback().await {
                tracing::warn!("Rollback of bulk insert into '{}' failed: {}", table, rollback_error);
            }
            return Err(e);
        }
        tx.commit().await
    }

    /// Delete the row with `primary_key`. Deleting a missing row is not an error.
    pub async fn delete(&self, model: &dyn Model, primary_key: &JsonValue) -> DatastoreResult<()> {
        let definition = model.definition();
        let table = self.table_name(model);
        let key = self.serializer.encode_primary_key(definition, primary_key);

        let query = QueryBuilder::new()
            .delete_from(&table)
            .where_eq(definition.primary_key_name(), key);
        let affected = self.execute(&query).await?;

        tracing::debug!("Deleted {} row(s) from '{}'", affected, table);
        Ok(())
    }

    /// Number of rows in the model's table
    pub async fn count(&self, model: &dyn Model) -> DatastoreResult<u64> {
        let table = self.table_name(model);
        let query = QueryBuilder::new().from(&table).count();
        let row = self.fetch_optional(&query).await?;

        let value = row
            .and_then(|mut row| row.remove("count"))
            .unwrap_or(DatabaseValue::Int64(0));
        match &value {
            DatabaseValue::Int64(n) if *n >= 0 => Ok(*n as u64),
            DatabaseValue::String(s) => s
                .parse()
                .map_err(|_| DatastoreError::decode("count", &value, "not a row count")),
            other => Err(DatastoreError::decode("count", other, "not a row count")),
        }
    }

    /// Run a search against the model's table.
    ///
    /// Rows that fail to decode are dropped. When the search is paginated the
    /// result carries the offset of the following page.
    pub async fn search(&self, model: &dyn Model, search: &OrmSearch) -> DatastoreResult<SearchResult> {
        let definition = model.definition();
        let table = self.table_name(model);
        let query = compile_search(&table, definition, &self.serializer, search)?;
        let rows = self.fetch_all(&query).await?;

        let fetched = rows.len() as u64;
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            match self.serializer.to_typed_record(definition, Some(row)) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Dropping undecodable row from '{}': {}", table, e),
            }
        }

        let page = query
            .is_paginated()
            .then(|| query.offset_amount().unwrap_or(0) + fetched);

        tracing::debug!(
            "Search on '{}' returned {} of {} rows",
            table,
            records.len(),
            fetched
        );
        Ok(SearchResult { records, page })
    }

    async fn fetch_by_primary_key(
        &self,
        model: &dyn Model,
        table: &str,
        primary_key: &JsonValue,
    ) -> DatastoreResult<Option<StorageRow>> {
        let definition = model.definition();
        let key = self.serializer.encode_primary_key(definition, primary_key);
        let query = QueryBuilder::new()
            .from(table)
            .where_eq(definition.primary_key_name(), key)
            .limit(1);
        self.fetch_optional(&query).await
    }

    async fn execute(&self, query: &QueryBuilder) -> DatastoreResult<u64> {
        let (sql, params) = query.to_sql_with_params(self.pool.sql_dialect());
        tracing::debug!("Executing: {}", sql);
        self.pool.execute(&sql, &params).await
    }

    async fn fetch_all(&self, query: &QueryBuilder) -> DatastoreResult<Vec<StorageRow>> {
        let (sql, params) = query.to_sql_with_params(self.pool.sql_dialect());
        tracing::debug!("Fetching: {}", sql);
        self.pool.fetch_all(&sql, &params).await
    }

    async fn fetch_optional(&self, query: &QueryBuilder) -> DatastoreResult<Option<StorageRow>> {
        let (sql, params) = query.to_sql_with_params(self.pool.sql_dialect());
        tracing::debug!("Fetching one: {}", sql);
        self.pool.fetch_optional(&sql, &params).await
    }
}

impl std::fmt::Debug for SqlDatastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlDatastore")
            .field("dialect", &self.pool.sql_dialect())
            .field("serializer", &self.serializer)
            .field("bulk_encode_concurrency", &self.bulk_encode_concurrency)
            .finish_non_exhaustive()
    }
}
