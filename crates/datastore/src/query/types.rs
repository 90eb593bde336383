//! Query Builder Types - Core types and enums for query building

use std::fmt;

use crate::backends::{DatabaseValue, SqlDialect};

/// Comparison operators supported in WHERE clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    /// Case-insensitive pattern match
    ILike,
}

impl QueryOperator {
    /// SQL spelling of the operator in `dialect`
    pub fn to_sql(&self, dialect: SqlDialect) -> &'static str {
        match self {
            QueryOperator::Equal => "=",
            QueryOperator::GreaterThan => ">",
            QueryOperator::GreaterThanOrEqual => ">=",
            QueryOperator::LessThan => "<",
            QueryOperator::LessThanOrEqual => "<=",
            QueryOperator::Like => "LIKE",
            QueryOperator::ILike => dialect.case_insensitive_like(),
        }
    }
}

/// Boolean joiner between sibling conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connector::And => write!(f, "AND"),
            Connector::Or => write!(f, "OR"),
        }
    }
}

/// A single WHERE predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: String,
        operator: QueryOperator,
        value: DatabaseValue,
    },
    IsNull {
        column: String,
    },
    /// Parenthesized sub-expression
    Group(Vec<WhereCondition>),
}

impl Predicate {
    /// Whether this predicate renders to nothing (an empty group)
    pub fn is_empty(&self) -> bool {
        match self {
            Predicate::Group(conditions) => conditions.iter().all(|c| c.predicate.is_empty()),
            _ => false,
        }
    }
}

/// A predicate together with the connector joining it to its predecessor.
/// The connector of the first condition in a list is not rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub connector: Connector,
    pub predicate: Predicate,
}

/// Order by direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Query types supported by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Count,
    Insert,
    Delete,
}
