//! Query Builder UPSERT operations (INSERT ... ON CONFLICT DO UPDATE)

use super::builder::QueryBuilder;
use crate::backends::SqlDialect;
use crate::query::sql_generation::quote_identifier;

impl QueryBuilder {
    /// On a conflict on `key`, overwrite every other inserted column with the
    /// incoming value
    pub fn on_conflict_merge(mut self, key: &str) -> Self {
        self.conflict_key = Some(key.to_string());
        self
    }

    /// Render the ON CONFLICT clause, if any
    pub(crate) fn build_conflict_clause(&self, sql: &mut String, dialect: SqlDialect) {
        let Some(key) = &self.conflict_key else {
            return;
        };

        let quoted_key = quote_identifier(dialect, key);
        let updates: Vec<String> = self
            .insert_columns
            .iter()
            .filter(|column| *column != key)
            .map(|column| {
                let quoted = quote_identifier(dialect, column);
                format!("{} = excluded.{}", quoted, quoted)
            })
            .collect();

        if updates.is_empty() {
            sql.push_str(&format!(" ON CONFLICT ({}) DO NOTHING", quoted_key));
        } else {
            sql.push_str(&format!(
                " ON CONFLICT ({}) DO UPDATE SET {}",
                quoted_key,
                updates.join(", ")
            ));
        }
    }
}
