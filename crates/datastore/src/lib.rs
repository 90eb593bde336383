//! # elif-datastore: Relational Datastore Adapter for elif.rs
//!
//! Persists model instances into relational tables and answers structured
//! searches against them. The crate is made of four layers:
//!
//! - a query compiler turning the search AST into parameterized SQL
//! - a codec registry converting property values to storage scalars and back
//! - a value serializer applying the registry across whole records
//! - repository operations (retrieve, save, bulk insert, delete, count, search)
//!
//! The caller owns the connection pool and injects it as a [`DatabasePool`].

pub mod backends;
pub mod codec;
pub mod config;
pub mod datastore;
pub mod error;
pub mod model;
pub mod query;
pub mod search;
pub mod serializer;

// Re-export core traits and types
pub use backends::{
    DatabasePool, DatabaseTransaction, DatabaseValue, PostgresPool, SqlDialect, SqlitePool,
    StorageRow,
};
pub use codec::{CodecRegistry, PropertyCodec};
pub use config::DatastoreConfig;
pub use datastore::{SearchResult, SqlDatastore};
pub use error::{DatastoreError, DatastoreResult};
pub use model::{
    Instance, KebabCaseTableNames, Model, ModelDefinition, ModelDefinitionBuilder, ModelInstance,
    PropertyDefinition, PropertyType, Record, TableNameResolver,
};
pub use query::QueryBuilder;
pub use search::{OrmSearch, PropertyOptions, SearchBuilder, SortOrder, Token};
pub use serializer::ValueSerializer;
