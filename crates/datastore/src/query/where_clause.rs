//! Query Builder WHERE clause operations

use super::builder::QueryBuilder;
use super::types::*;
use crate::backends::DatabaseValue;

impl QueryBuilder {
    /// Append a predicate joined by `connector`
    pub fn push_where(mut self, connector: Connector, predicate: Predicate) -> Self {
        self.where_conditions.push(WhereCondition {
            connector,
            predicate,
        });
        self
    }

    /// Add WHERE condition with equality. Null compiles to `IS NULL`.
    pub fn where_eq<T: Into<DatabaseValue>>(self, column: &str, value: T) -> Self {
        self.push_where(Connector::And, equality(column, value.into()))
    }

    pub fn or_where_eq<T: Into<DatabaseValue>>(self, column: &str, value: T) -> Self {
        self.push_where(Connector::Or, equality(column, value.into()))
    }

    /// Add WHERE condition with an explicit operator
    pub fn where_op<T: Into<DatabaseValue>>(self, column: &str, operator: QueryOperator, value: T) -> Self {
        self.push_where(Connector::And, compare(column, operator, value.into()))
    }

    /// Add WHERE condition with LIKE
    pub fn where_like(self, column: &str, pattern: &str) -> Self {
        self.push_where(Connector::And, compare(column, QueryOperator::Like, pattern.into()))
    }

    /// Add WHERE condition with case-insensitive LIKE
    pub fn where_ilike(self, column: &str, pattern: &str) -> Self {
        self.push_where(Connector::And, compare(column, QueryOperator::ILike, pattern.into()))
    }

    /// Add a parenthesized group built by `build`
    ///
    /// ```
    /// use elif_datastore::query::QueryBuilder;
    ///
    /// let query = QueryBuilder::new()
    ///     .from("users")
    ///     .where_eq("active", true)
    ///     .where_group(|q| q.where_eq("role", "admin").or_where_eq("role", "owner"));
    /// assert_eq!(query.where_conditions().len(), 2);
    /// ```
    pub fn where_group<F>(self, build: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let group = build(QueryBuilder::new()).where_conditions;
        self.push_where(Connector::And, Predicate::Group(group))
    }

    pub fn or_where_group<F>(self, build: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let group = build(QueryBuilder::new()).where_conditions;
        self.push_where(Connector::Or, Predicate::Group(group))
    }
}

fn equality(column: &str, value: DatabaseValue) -> Predicate {
    if value.is_null() {
        Predicate::IsNull {
            column: column.to_string(),
        }
    } else {
        compare(column, QueryOperator::Equal, value)
    }
}

fn compare(column: &str, operator: QueryOperator, value: DatabaseValue) -> Predicate {
    Predicate::Compare {
        column: column.to_string(),
        operator,
        value,
    }
}
