//! Query Compiler - translates a search AST into a [`QueryBuilder`]
//!
//! Sequences are walked left to right with a pending connector. A sequence
//! without links applies its members one after another with AND. A sequence
//! containing links wraps each value token in its own group, joined by the
//! link that preceded it; the connector resets to AND after every value.

use serde_json::Value as JsonValue;

use super::ast::*;
use super::validate::validate_search;
use crate::backends::{to_iso_string, DatabaseValue};
use crate::error::DatastoreResult;
use crate::model::ModelDefinition;
use crate::query::{
    Connector, OrderDirection, Predicate, QueryBuilder, QueryOperator, WhereCondition,
};
use crate::serializer::ValueSerializer;

/// Compile `search` into a SELECT against `table`.
///
/// Comparison values are encoded with the codec of the property they are
/// compared against, so they match what `save` wrote to the column.
pub fn compile_search(
    table: &str,
    definition: &ModelDefinition,
    serializer: &ValueSerializer,
    search: &OrmSearch,
) -> DatastoreResult<QueryBuilder> {
    validate_search(search)?;

    let compiler = Compiler {
        definition,
        serializer,
    };
    let mut query = compiler.sequence(QueryBuilder::new().from(table), &search.query, Connector::And);

    // A zero take or page is treated as absent
    if let Some(take) = search.take.filter(|t| *t > 0) {
        query = query.limit(take);
    }
    if let Some(page) = search.page.filter(|p| *p > 0) {
        query = query.offset(page);
    }
    if let Some(sort) = &search.sort {
        let direction = match sort.order {
            SortOrder::Asc => OrderDirection::Asc,
            SortOrder::Desc => OrderDirection::Desc,
        };
        query = query.order_by_direction(&sort.key, direction);
    }

    Ok(query)
}

struct Compiler<'a> {
    definition: &'a ModelDefinition,
    serializer: &'a ValueSerializer,
}

impl Compiler<'_> {
    fn token(&self, query: QueryBuilder, token: &Token, connector: Connector) -> QueryBuilder {
        match token {
            Token::Leaf(leaf) => query.push_where(connector, self.leaf_predicate(leaf)),
            // A group with links is one parenthesized unit in the outer expression
            Token::Group(tokens) if tokens.iter().any(Token::is_link) => {
                query.push_where(connector, Predicate::Group(self.isolated(token)))
            }
            Token::Group(tokens) => self.sequence(query, tokens, connector),
            // Links are consumed by sequence()
            Token::And | Token::Or => query,
        }
    }

    /// Conditions of `token` compiled on their own, ready to be wrapped in a group
    fn isolated(&self, token: &Token) -> Vec<WhereCondition> {
        let query = match token {
            Token::Group(tokens) => self.sequence(QueryBuilder::new(), tokens, Connector::And),
            other => self.token(QueryBuilder::new(), other, Connector::And),
        };
        query.where_conditions
    }

    fn sequence(&self, query: QueryBuilder, tokens: &[Token], connector: Connector) -> QueryBuilder {
        if !tokens.iter().any(Token::is_link) {
            return match connector {
                Connector::And => tokens
                    .iter()
                    .fold(query, |q, token| self.token(q, token, Connector::And)),
                Connector::Or => {
                    let group = self.sequence(QueryBuilder::new(), tokens, Connector::And);
                    query.push_where(Connector::Or, Predicate::Group(group.where_conditions))
                }
            };
        }

        let mut query = query;
        let mut pending = connector;
        for token in tokens {
            match token {
                Token::And => pending = Connector::And,
                Token::Or => pending = Connector::Or,
                value => {
                    query = query.push_where(pending, Predicate::Group(self.isolated(value)));
                    pending = Connector::And;
                }
            }
        }
        query
    }

    fn leaf_predicate(&self, leaf: &Leaf) -> Predicate {
        match leaf {
            Leaf::Property(property) => self.property_predicate(property),
            Leaf::DatesBefore(q) => Predicate::Compare {
                column: q.key.clone(),
                operator: if q.options.equal_to_and_before {
                    QueryOperator::LessThanOrEqual
                } else {
                    QueryOperator::LessThan
                },
                value: self.date_value(&q.key, &q.date),
            },
            Leaf::DatesAfter(q) => Predicate::Compare {
                column: q.key.clone(),
                operator: if q.options.equal_to_and_after {
                    QueryOperator::GreaterThanOrEqual
                } else {
                    QueryOperator::GreaterThan
                },
                value: self.date_value(&q.key, &q.date),
            },
        }
    }

    fn property_predicate(&self, property: &PropertyQuery) -> Predicate {
        let options = &property.options;
        let column = property.key.clone();

        // caseSensitive selects ILIKE, matching the query builders that produce it
        if options.case_sensitive || options.is_pattern() {
            let operator = if options.case_sensitive {
                QueryOperator::ILike
            } else {
                QueryOperator::Like
            };
            return Predicate::Compare {
                column,
                operator,
                value: DatabaseValue::String(search_pattern(property)),
            };
        }

        let value = self
            .serializer
            .encode_property(self.definition, &property.key, &property.value);
        let operator = match options.equality_symbol {
            EqualitySymbol::Eq if value.is_null() => return Predicate::IsNull { column },
            EqualitySymbol::Eq => QueryOperator::Equal,
            EqualitySymbol::Gt => QueryOperator::GreaterThan,
            EqualitySymbol::Gte => QueryOperator::GreaterThanOrEqual,
            EqualitySymbol::Lt => QueryOperator::LessThan,
            EqualitySymbol::Lte => QueryOperator::LessThanOrEqual,
        };
        Predicate::Compare {
            column,
            operator,
            value,
        }
    }

    /// Date bounds go through the column's codec; undeclared columns get a timestamp
    fn date_value(&self, key: &str, date: &chrono::DateTime<chrono::Utc>) -> DatabaseValue {
        match self.definition.property(key) {
            Some(_) => self.serializer.encode_property(
                self.definition,
                key,
                &JsonValue::String(to_iso_string(date)),
            ),
            None => DatabaseValue::DateTime(*date),
        }
    }
}

/// Wildcard the raw value for `startsWith` / `endsWith`
fn search_pattern(property: &PropertyQuery) -> String {
    let mut pattern = match &property.value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    if property.options.starts_with {
        pattern.push('%');
    }
    if property.options.ends_with {
        pattern.insert(0, '%');
    }
    pattern
}
