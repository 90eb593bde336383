//! Query Builder DML operations (INSERT, DELETE)

use super::builder::QueryBuilder;
use super::types::*;
use crate::backends::DatabaseValue;

impl QueryBuilder {
    /// Start an INSERT query
    pub fn insert_into(mut self, table: &str) -> Self {
        self.query_type = QueryType::Insert;
        self.table = Some(table.to_string());
        self
    }

    /// Set the inserted columns
    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.insert_columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Append one row of values, in column order
    pub fn values(mut self, row: Vec<DatabaseValue>) -> Self {
        self.insert_rows.push(row);
        self
    }

    /// Start a DELETE query
    pub fn delete_from(mut self, table: &str) -> Self {
        self.query_type = QueryType::Delete;
        self.table = Some(table.to_string());
        self
    }
}
