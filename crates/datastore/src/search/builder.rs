//! Fluent construction of searches
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use elif_datastore::search::{PropertyOptions, SearchBuilder, SortOrder};
//! use serde_json::json;
//!
//! let april = Utc.with_ymd_and_hms(2022, 4, 3, 0, 0, 0).unwrap();
//! let search = SearchBuilder::new()
//!     .complex(|b| b
//!         .property("name", json!("a"), PropertyOptions::new().starts_with())
//!         .and()
//!         .dates_before("myDate", april, false))
//!     .or()
//!     .complex(|b| b
//!         .property("name", json!("z"), PropertyOptions::new().ends_with())
//!         .and()
//!         .dates_after("myDate", april, true))
//!     .sort("name", SortOrder::Asc)
//!     .compile()
//!     .unwrap();
//! assert_eq!(search.query.len(), 3);
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use super::ast::*;
use super::validate::validate_search;
use crate::error::DatastoreResult;

#[derive(Debug, Clone, Default)]
pub struct SearchBuilder {
    tokens: Vec<Token>,
    sort: Option<SortStatement>,
    take: Option<u64>,
    page: Option<u64>,
}

impl SearchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, key: &str, value: JsonValue, options: PropertyOptions) -> Self {
        self.tokens.push(Token::Leaf(Leaf::Property(PropertyQuery {
            key: key.to_string(),
            value,
            options,
        })));
        self
    }

    pub fn dates_before(mut self, key: &str, date: DateTime<Utc>, equal_to_and_before: bool) -> Self {
        self.tokens.push(Token::Leaf(Leaf::DatesBefore(DatesBeforeQuery {
            key: key.to_string(),
            date,
            options: DatesBeforeOptions { equal_to_and_before },
        })));
        self
    }

    pub fn dates_after(mut self, key: &str, date: DateTime<Utc>, equal_to_and_after: bool) -> Self {
        self.tokens.push(Token::Leaf(Leaf::DatesAfter(DatesAfterQuery {
            key: key.to_string(),
            date,
            options: DatesAfterOptions { equal_to_and_after },
        })));
        self
    }

    pub fn and(mut self) -> Self {
        self.tokens.push(Token::And);
        self
    }

    pub fn or(mut self) -> Self {
        self.tokens.push(Token::Or);
        self
    }

    /// Append a parenthesized group built by `build`. Sort and pagination set
    /// inside the group are ignored.
    pub fn complex<F>(mut self, build: F) -> Self
    where
        F: FnOnce(SearchBuilder) -> SearchBuilder,
    {
        let inner = build(SearchBuilder::new());
        self.tokens.push(Token::Group(inner.tokens));
        self
    }

    pub fn sort(mut self, key: &str, order: SortOrder) -> Self {
        self.sort = Some(SortStatement {
            key: key.to_string(),
            order,
        });
        self
    }

    /// Maximum number of rows
    pub fn take(mut self, count: u64) -> Self {
        self.take = Some(count);
        self
    }

    /// Number of rows to skip
    pub fn pagination(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Finish the search, validating its structure
    pub fn compile(self) -> DatastoreResult<OrmSearch> {
        let search = OrmSearch {
            query: self.tokens,
            sort: self.sort,
            take: self.take,
            page: self.page,
        };
        validate_search(&search)?;
        Ok(search)
    }
}
