//! Search AST - the abstract query a caller hands to `search`
//!
//! The JSON form mirrors the one produced by JavaScript query builders: leaves
//! are objects tagged by `type`, links are the strings `"AND"` / `"OR"` and
//! groups are nested arrays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{DatastoreError, DatastoreResult};

/// Comparison applied by a property leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EqualitySymbol {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
}

/// Matching options for a property leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyOptions {
    pub starts_with: bool,
    pub ends_with: bool,
    pub case_sensitive: bool,
    pub equality_symbol: EqualitySymbol,
}

impl PropertyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts_with(mut self) -> Self {
        self.starts_with = true;
        self
    }

    pub fn ends_with(mut self) -> Self {
        self.ends_with = true;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn equality(mut self, symbol: EqualitySymbol) -> Self {
        self.equality_symbol = symbol;
        self
    }

    /// Whether a LIKE-style pattern match was requested
    pub fn is_pattern(&self) -> bool {
        self.starts_with || self.ends_with
    }
}

/// `property(key, value, options)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PropertyQueryWire", into = "PropertyQueryWire")]
pub struct PropertyQuery {
    pub key: String,
    pub value: JsonValue,
    pub options: PropertyOptions,
}

/// `datesBefore(key, date, {equalToAndBefore})`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesBeforeQuery {
    pub key: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub options: DatesBeforeOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesBeforeOptions {
    #[serde(default)]
    pub equal_to_and_before: bool,
}

/// `datesAfter(key, date, {equalToAndAfter})`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesAfterQuery {
    pub key: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub options: DatesAfterOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesAfterOptions {
    #[serde(default)]
    pub equal_to_and_after: bool,
}

/// A value token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Leaf {
    Property(PropertyQuery),
    DatesBefore(DatesBeforeQuery),
    DatesAfter(DatesAfterQuery),
}

impl Leaf {
    /// Column the leaf compares against
    pub fn key(&self) -> &str {
        match self {
            Leaf::Property(q) => &q.key,
            Leaf::DatesBefore(q) => &q.key,
            Leaf::DatesAfter(q) => &q.key,
        }
    }
}

/// One element of a token sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TokenWire", into = "TokenWire")]
pub enum Token {
    Leaf(Leaf),
    And,
    Or,
    /// Parenthesized sub-sequence
    Group(Vec<Token>),
}

impl Token {
    pub fn is_link(&self) -> bool {
        matches!(self, Token::And | Token::Or)
    }
}

impl From<Leaf> for Token {
    fn from(leaf: Leaf) -> Self {
        Token::Leaf(leaf)
    }
}

/// Sort direction. `asc` is ascending, any other value descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl From<String> for SortOrder {
    fn from(value: String) -> Self {
        if value == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => "asc".to_string(),
            SortOrder::Desc => "dsc".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortStatement {
    pub key: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// A complete search: boolean token sequence plus sort and pagination
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrmSearch {
    pub query: Vec<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortStatement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
}

impl OrmSearch {
    pub fn new(query: Vec<Token>) -> Self {
        Self {
            query,
            ..Default::default()
        }
    }

    /// Parse a search from its JSON form. Any unrecognised shape is a
    /// malformed query.
    pub fn from_json(value: JsonValue) -> DatastoreResult<Self> {
        serde_json::from_value(value).map_err(|e| DatastoreError::MalformedQuery(e.to_string()))
    }

    pub fn to_json(&self) -> DatastoreResult<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Serialize, Deserialize)]
enum LinkWire {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TokenWire {
    Link(LinkWire),
    Group(Vec<Token>),
    Leaf(Leaf),
}

impl From<TokenWire> for Token {
    fn from(wire: TokenWire) -> Self {
        match wire {
            TokenWire::Link(LinkWire::And) => Token::And,
            TokenWire::Link(LinkWire::Or) => Token::Or,
            TokenWire::Group(tokens) => Token::Group(tokens),
            TokenWire::Leaf(leaf) => Token::Leaf(leaf),
        }
    }
}

impl From<Token> for TokenWire {
    fn from(token: Token) -> Self {
        match token {
            Token::And => TokenWire::Link(LinkWire::And),
            Token::Or => TokenWire::Link(LinkWire::Or),
            Token::Group(tokens) => TokenWire::Group(tokens),
            Token::Leaf(leaf) => TokenWire::Leaf(leaf),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyQueryWire {
    key: String,
    #[serde(default)]
    value: JsonValue,
    #[serde(default)]
    equality_symbol: EqualitySymbol,
    #[serde(default)]
    options: PropertyOptionsWire,
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyOptionsWire {
    #[serde(default)]
    starts_with: bool,
    #[serde(default)]
    ends_with: bool,
    #[serde(default)]
    case_sensitive: bool,
}

impl From<PropertyQueryWire> for PropertyQuery {
    fn from(wire: PropertyQueryWire) -> Self {
        Self {
            key: wire.key,
            value: wire.value,
            options: PropertyOptions {
                starts_with: wire.options.starts_with,
                ends_with: wire.options.ends_with,
                case_sensitive: wire.options.case_sensitive,
                equality_symbol: wire.equality_symbol,
            },
        }
    }
}

impl From<PropertyQuery> for PropertyQueryWire {
    fn from(query: PropertyQuery) -> Self {
        Self {
            key: query.key,
            value: query.value,
            equality_symbol: query.options.equality_symbol,
            options: PropertyOptionsWire {
                starts_with: query.options.starts_with,
                ends_with: query.options.ends_with,
                case_sensitive: query.options.case_sensitive,
            },
        }
    }
}
