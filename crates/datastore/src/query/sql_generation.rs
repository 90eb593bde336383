//! Query Builder SQL generation
//!
//! Values are emitted as dialect placeholders and returned alongside the SQL,
//! except `NULL`, which is written literally so it never needs a typed bind.

use super::builder::QueryBuilder;
use super::types::*;
use crate::backends::{DatabaseValue, SqlDialect};

/// Quote an identifier, doubling any embedded quote characters
pub fn quote_identifier(dialect: SqlDialect, identifier: &str) -> String {
    let quote = dialect.identifier_quote();
    let escaped = identifier.replace(quote, &format!("{}{}", quote, quote));
    format!("{}{}{}", quote, escaped, quote)
}

/// Accumulates bound parameters and hands out placeholders
struct ParamSink {
    dialect: SqlDialect,
    params: Vec<DatabaseValue>,
}

impl ParamSink {
    fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    /// Placeholder for `value`, or the literal `NULL`
    fn push(&mut self, value: &DatabaseValue) -> String {
        if value.is_null() {
            return "NULL".to_string();
        }
        let placeholder = self.dialect.parameter_placeholder(self.params.len());
        self.params.push(value.clone());
        placeholder
    }
}

impl QueryBuilder {
    /// Generate SQL for `dialect` with parameter placeholders and return the
    /// parameters in binding order
    pub fn to_sql_with_params(&self, dialect: SqlDialect) -> (String, Vec<DatabaseValue>) {
        let mut sink = ParamSink::new(dialect);
        let sql = match self.query_type {
            QueryType::Select => self.build_select_sql(&mut sink),
            QueryType::Count => self.build_count_sql(&mut sink),
            QueryType::Insert => self.build_insert_sql(&mut sink),
            QueryType::Delete => self.build_delete_sql(&mut sink),
        };
        (sql, sink.params)
    }

    /// Build SELECT SQL
    fn build_select_sql(&self, sink: &mut ParamSink) -> String {
        let dialect = sink.dialect;
        let mut sql = String::from("SELECT *");
        self.build_from_clause(&mut sql, dialect);
        self.build_where_clause(&mut sql, sink);
        self.build_order_limit_clause(&mut sql, dialect);
        sql
    }

    /// Build SELECT COUNT(*) SQL
    fn build_count_sql(&self, sink: &mut ParamSink) -> String {
        let dialect = sink.dialect;
        let mut sql = format!("SELECT COUNT(*) AS {}", quote_identifier(dialect, "count"));
        self.build_from_clause(&mut sql, dialect);
        self.build_where_clause(&mut sql, sink);
        sql
    }

    /// Build (multi-row) INSERT SQL
    fn build_insert_sql(&self, sink: &mut ParamSink) -> String {
        let dialect = sink.dialect;
        let mut sql = String::from("INSERT INTO ");
        if let Some(table) = &self.table {
            sql.push_str(&quote_identifier(dialect, table));
        }

        let columns: Vec<String> = self
            .insert_columns
            .iter()
            .map(|c| quote_identifier(dialect, c))
            .collect();
        sql.push_str(&format!(" ({}) VALUES ", columns.join(", ")));

        let rows: Vec<String> = self
            .insert_rows
            .iter()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|value| sink.push(value)).collect();
                format!("({})", values.join(", "))
            })
            .collect();
        sql.push_str(&rows.join(", "));

        self.build_conflict_clause(&mut sql, dialect);
        sql
    }

    /// Build DELETE SQL
    fn build_delete_sql(&self, sink: &mut ParamSink) -> String {
        let dialect = sink.dialect;
        let mut sql = String::from("DELETE FROM ");
        if let Some(table) = &self.table {
            sql.push_str(&quote_identifier(dialect, table));
        }
        self.build_where_clause(&mut sql, sink);
        sql
    }

    fn build_from_clause(&self, sql: &mut String, dialect: SqlDialect) {
        if let Some(table) = &self.table {
            sql.push_str(" FROM ");
            sql.push_str(&quote_identifier(dialect, table));
        }
    }

    fn build_where_clause(&self, sql: &mut String, sink: &mut ParamSink) {
        let mut clause = String::new();
        build_conditions(&self.where_conditions, &mut clause, sink);
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
    }

    fn build_order_limit_clause(&self, sql: &mut String, dialect: SqlDialect) {
        if !self.order_by.is_empty() {
            let clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| {
                    format!("{} {}", quote_identifier(dialect, column), direction)
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&clauses.join(", "));
        }

        match (self.limit_count, self.offset_value) {
            (Some(limit), _) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(_)) => {
                if let Some(unbounded) = dialect.unbounded_limit() {
                    sql.push(' ');
                    sql.push_str(unbounded);
                }
            }
            (None, None) => {}
        }

        if let Some(offset) = self.offset_value {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
    }
}

/// Render a condition list. Empty groups are skipped and the first rendered
/// condition drops its connector.
fn build_conditions(conditions: &[WhereCondition], sql: &mut String, sink: &mut ParamSink) {
    let dialect = sink.dialect;
    let mut first = true;

    for condition in conditions.iter().filter(|c| !c.predicate.is_empty()) {
        if !first {
            sql.push_str(&format!(" {} ", condition.connector));
        }
        first = false;

        match &condition.predicate {
            Predicate::Compare {
                column,
                operator,
                value,
            } => {
                let placeholder = sink.push(value);
                sql.push_str(&format!(
                    "{} {} {}",
                    quote_identifier(dialect, column),
                    operator.to_sql(dialect),
                    placeholder
                ));
            }
            Predicate::IsNull { column } => {
                sql.push_str(&format!("{} IS NULL", quote_identifier(dialect, column)));
            }
            Predicate::Group(inner) => {
                sql.push('(');
                build_conditions(inner, sql, sink);
                sql.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier(SqlDialect::PostgreSQL, "dated-model"), "\"dated-model\"");
        assert_eq!(quote_identifier(SqlDialect::SQLite, "tab\"le"), "\"tab\"\"le\"");
    }

    #[test]
    fn test_select_with_grouped_conditions() {
        let query = QueryBuilder::new()
            .from("test-model")
            .where_eq("name", "abc")
            .or_where_group(|q| q.where_like("name", "x%").where_op("age", QueryOperator::GreaterThan, 3i64));

        let (sql, params) = query.to_sql_with_params(SqlDialect::PostgreSQL);
        assert_eq!(
            sql,
            "SELECT * FROM \"test-model\" WHERE \"name\" = $1 OR (\"name\" LIKE $2 AND \"age\" > $3)"
        );
        assert_eq!(
            params,
            vec![
                DatabaseValue::String("abc".into()),
                DatabaseValue::String("x%".into()),
                DatabaseValue::Int64(3),
            ]
        );
    }

    #[test]
    fn test_leading_or_and_empty_groups() {
        let query = QueryBuilder::new()
            .from("t")
            .where_group(|q| q.where_group(|q| q))
            .or_where_eq("a", 1i64);

        let (sql, _) = query.to_sql_with_params(SqlDialect::SQLite);
        assert_eq!(sql, "SELECT * FROM \"t\" WHERE \"a\" = ?");
    }

    #[test]
    fn test_null_equality_and_ilike_by_dialect() {
        let query = QueryBuilder::new()
            .from("t")
            .where_eq("deleted", DatabaseValue::Null)
            .where_ilike("name", "%abc%");

        let (sql, params) = query.to_sql_with_params(SqlDialect::PostgreSQL);
        assert_eq!(sql, "SELECT * FROM \"t\" WHERE \"deleted\" IS NULL AND \"name\" ILIKE $1");
        assert_eq!(params.len(), 1);

        let (sql, _) = query.to_sql_with_params(SqlDialect::SQLite);
        assert_eq!(sql, "SELECT * FROM \"t\" WHERE \"deleted\" IS NULL AND \"name\" LIKE ?");
    }

    #[test]
    fn test_order_limit_offset() {
        let query = QueryBuilder::new().from("t").order_by_desc("name").limit(2).offset(4);
        let (sql, _) = query.to_sql_with_params(SqlDialect::PostgreSQL);
        assert_eq!(sql, "SELECT * FROM \"t\" ORDER BY \"name\" DESC LIMIT 2 OFFSET 4");

        let offset_only = QueryBuilder::new().from("t").offset(3);
        let (sql, _) = offset_only.to_sql_with_params(SqlDialect::SQLite);
        assert_eq!(sql, "SELECT * FROM \"t\" LIMIT -1 OFFSET 3");
        let (sql, _) = offset_only.to_sql_with_params(SqlDialect::PostgreSQL);
        assert_eq!(sql, "SELECT * FROM \"t\" OFFSET 3");
    }

    #[test]
    fn test_multi_row_insert_with_null_literal() {
        let query = QueryBuilder::new()
            .insert_into("t")
            .columns(&["id", "name"])
            .values(vec!["1".into(), DatabaseValue::Null])
            .values(vec!["2".into(), "b".into()]);

        let (sql, params) = query.to_sql_with_params(SqlDialect::PostgreSQL);
        assert_eq!(
            sql,
            "INSERT INTO \"t\" (\"id\", \"name\") VALUES ($1, NULL), ($2, $3)"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_upsert_merges_non_key_columns() {
        let query = QueryBuilder::new()
            .insert_into("t")
            .columns(&["id", "name", "age"])
            .values(vec!["1".into(), "a".into(), 2i64.into()])
            .on_conflict_merge("id");

        let (sql, _) = query.to_sql_with_params(SqlDialect::SQLite);
        assert_eq!(
            sql,
            "INSERT INTO \"t\" (\"id\", \"name\", \"age\") VALUES (?, ?, ?) \
             ON CONFLICT (\"id\") DO UPDATE SET \"name\" = excluded.\"name\", \"age\" = excluded.\"age\""
        );

        let key_only = QueryBuilder::new()
            .insert_into("t")
            .columns(&["id"])
            .values(vec!["1".into()])
            .on_conflict_merge("id");
        let (sql, _) = key_only.to_sql_with_params(SqlDialect::SQLite);
        assert!(sql.ends_with("ON CONFLICT (\"id\") DO NOTHING"));
    }

    #[test]
    fn test_delete_and_count() {
        let (sql, params) = QueryBuilder::new()
            .delete_from("t")
            .where_eq("id", "1")
            .to_sql_with_params(SqlDialect::PostgreSQL);
        assert_eq!(sql, "DELETE FROM \"t\" WHERE \"id\" = $1");
        assert_eq!(params, vec![DatabaseValue::String("1".into())]);

        let (sql, params) = QueryBuilder::new()
            .from("t")
            .count()
            .to_sql_with_params(SqlDialect::SQLite);
        assert_eq!(sql, "SELECT COUNT(*) AS \"count\" FROM \"t\"");
        assert!(params.is_empty());
    }
}
