//! Query Builder - Core builder implementation

use super::types::*;
use crate::backends::DatabaseValue;

/// Query builder for constructing database queries
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    pub(crate) query_type: QueryType,
    pub(crate) table: Option<String>,
    pub(crate) where_conditions: Vec<WhereCondition>,
    pub(crate) order_by: Vec<(String, OrderDirection)>,
    pub(crate) limit_count: Option<u64>,
    pub(crate) offset_value: Option<u64>,
    pub(crate) insert_columns: Vec<String>,
    pub(crate) insert_rows: Vec<Vec<DatabaseValue>>,
    pub(crate) conflict_key: Option<String>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self {
            query_type: QueryType::Select,
            table: None,
            where_conditions: Vec::new(),
            order_by: Vec::new(),
            limit_count: None,
            offset_value: None,
            insert_columns: Vec::new(),
            insert_rows: Vec::new(),
            conflict_key: None,
        }
    }

    /// Set the table to read from
    pub fn from(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Turn the query into `SELECT COUNT(*)`
    pub fn count(mut self) -> Self {
        self.query_type = QueryType::Count;
        self
    }

    pub fn where_conditions(&self) -> &[WhereCondition] {
        &self.where_conditions
    }

    pub fn offset_amount(&self) -> Option<u64> {
        self.offset_value
    }

    /// Whether a LIMIT or OFFSET was requested
    pub fn is_paginated(&self) -> bool {
        self.limit_count.is_some() || self.offset_value.is_some()
    }
}
