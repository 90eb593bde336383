//! Datastore configuration

use std::env;
use std::fmt;
use std::sync::Arc;

use crate::codec::CodecRegistry;
use crate::error::{DatastoreError, DatastoreResult};
use crate::model::{KebabCaseTableNames, TableNameResolver};

/// Environment variable controlling per-instance encode parallelism in bulk inserts
pub const BULK_ENCODE_CONCURRENCY_VAR: &str = "DATASTORE_BULK_ENCODE_CONCURRENCY";

/// Options for a [`SqlDatastore`](crate::SqlDatastore)
#[derive(Clone)]
pub struct DatastoreConfig {
    pub codecs: CodecRegistry,
    pub table_names: Arc<dyn TableNameResolver>,
    pub bulk_encode_concurrency: usize,
}

impl DatastoreConfig {
    pub fn new() -> Self {
        Self {
            codecs: CodecRegistry::default(),
            table_names: Arc::new(KebabCaseTableNames),
            bulk_encode_concurrency: 1,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> DatastoreResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> DatastoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(value) = lookup(BULK_ENCODE_CONCURRENCY_VAR) {
            config.bulk_encode_concurrency = value.trim().parse().map_err(|_| {
                DatastoreError::Configuration(format!(
                    "{} must be a positive integer, got '{}'",
                    BULK_ENCODE_CONCURRENCY_VAR, value
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DatastoreResult<()> {
        if self.bulk_encode_concurrency == 0 {
            return Err(DatastoreError::Configuration(
                "bulk encode concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace the codec registry
    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    /// Replace the table naming strategy
    pub fn with_table_names<R>(mut self, resolver: R) -> Self
    where
        R: TableNameResolver + 'static,
    {
        self.table_names = Arc::new(resolver);
        self
    }

    pub fn with_bulk_encode_concurrency(mut self, concurrency: usize) -> Self {
        self.bulk_encode_concurrency = concurrency;
        self
    }
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DatastoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatastoreConfig")
            .field("codecs", &self.codecs)
            .field("bulk_encode_concurrency", &self.bulk_encode_concurrency)
            .finish_non_exhaustive()
    }
}
