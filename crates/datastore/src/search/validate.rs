//! Structural validation of a search before compilation

use super::ast::{OrmSearch, Token};
use crate::error::{DatastoreError, DatastoreResult};

/// Reject token sequences the compiler cannot interpret: sequences that start
/// or end with a link, adjacent links, empty nested groups and empty keys.
pub fn validate_search(search: &OrmSearch) -> DatastoreResult<()> {
    validate_sequence(&search.query, true)?;

    if let Some(sort) = &search.sort {
        if sort.key.is_empty() {
            return Err(DatastoreError::MalformedQuery(
                "sort key cannot be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_sequence(tokens: &[Token], top_level: bool) -> DatastoreResult<()> {
    if tokens.is_empty() && !top_level {
        return Err(DatastoreError::MalformedQuery(
            "nested query group cannot be empty".to_string(),
        ));
    }

    if tokens.first().map_or(false, Token::is_link) {
        return Err(DatastoreError::MalformedQuery(
            "query sequence cannot start with AND/OR".to_string(),
        ));
    }
    if tokens.last().map_or(false, Token::is_link) {
        return Err(DatastoreError::MalformedQuery(
            "query sequence cannot end with AND/OR".to_string(),
        ));
    }
    if tokens.windows(2).any(|pair| pair[0].is_link() && pair[1].is_link()) {
        return Err(DatastoreError::MalformedQuery(
            "AND/OR must be followed by a query, not another link".to_string(),
        ));
    }

    for token in tokens {
        match token {
            Token::Leaf(leaf) if leaf.key().is_empty() => {
                return Err(DatastoreError::MalformedQuery(
                    "query key cannot be empty".to_string(),
                ));
            }
            Token::Group(inner) => validate_sequence(inner, false)?,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ast::{Leaf, PropertyOptions, PropertyQuery};
    use serde_json::json;

    fn leaf(key: &str) -> Token {
        Token::Leaf(Leaf::Property(PropertyQuery {
            key: key.to_string(),
            value: json!("x"),
            options: PropertyOptions::new(),
        }))
    }

    #[test]
    fn test_valid_sequences() {
        assert!(validate_search(&OrmSearch::new(vec![])).is_ok());
        assert!(validate_search(&OrmSearch::new(vec![leaf("a"), leaf("b")])).is_ok());
        assert!(validate_search(&OrmSearch::new(vec![
            Token::Group(vec![leaf("a"), Token::And, leaf("b")]),
            Token::Or,
            leaf("c"),
        ]))
        .is_ok());
    }

    #[test]
    fn test_malformed_sequences() {
        let cases = vec![
            vec![Token::And, leaf("a")],
            vec![leaf("a"), Token::Or],
            vec![leaf("a"), Token::And, Token::Or, leaf("b")],
            vec![leaf("a"), Token::And, Token::Group(vec![])],
            vec![Token::Group(vec![leaf("")])],
        ];
        for tokens in cases {
            assert!(
                matches!(
                    validate_search(&OrmSearch::new(tokens.clone())),
                    Err(DatastoreError::MalformedQuery(_))
                ),
                "expected {:?} to be rejected",
                tokens
            );
        }
    }
}
