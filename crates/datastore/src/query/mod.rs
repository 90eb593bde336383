//! Query Builder Module - fluent builder producing dialect-aware SQL with
//! bound parameters

pub mod builder;
pub mod dml;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;
pub mod types;
pub mod upsert;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use sql_generation::quote_identifier;
pub use types::{Connector, OrderDirection, Predicate, QueryOperator, QueryType, WhereCondition};
