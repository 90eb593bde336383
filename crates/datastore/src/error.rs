//! Error types for the datastore adapter
//!
//! Query-shape, batch and decode failures are raised by the adapter itself.
//! Store-level failures (constraint violations, connectivity) are carried
//! through untouched in [`DatastoreError::Database`].

/// Result type alias for datastore operations
pub type DatastoreResult<T> = Result<T, DatastoreError>;

/// Error types for datastore operations
#[derive(Debug, thiserror::Error)]
pub enum DatastoreError {
    /// The search contains a token sequence the compiler cannot interpret
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// A bulk batch mixes instances of different models
    #[error("Cannot bulk insert more than one model type: {}", models.join(", "))]
    HeterogeneousBatch { models: Vec<String> },

    /// The fallback decoder could not classify a stored value
    #[error("Cannot determine type of {value}! Type: {kind}")]
    TypeResolution { value: String, kind: String },

    /// A registered codec rejected a stored value
    #[error("Cannot decode {value} as {property_type}: {message}")]
    Decode {
        property_type: String,
        value: String,
        message: String,
    },

    /// Model definition is inconsistent (duplicate or missing primary key, etc.)
    #[error("Invalid model definition: {0}")]
    InvalidDefinition(String),

    /// Instance has no value for its primary key property
    #[error("Primary key '{0}' is missing or null")]
    MissingPrimaryKey(String),

    /// A row expected to exist was not found
    #[error("Record not found in table '{table}' for key {key}")]
    NotFound { table: String, key: String },

    /// Adapter configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error reported by the relational driver
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DatastoreError {
    /// Build a decode error for a codec rejecting `value`
    pub(crate) fn decode(
        property_type: &str,
        value: impl std::fmt::Debug,
        message: impl Into<String>,
    ) -> Self {
        DatastoreError::Decode {
            property_type: property_type.to_string(),
            value: format!("{:?}", value),
            message: message.into(),
        }
    }

    /// Whether this error came from the relational driver
    pub fn is_database(&self) -> bool {
        matches!(self, DatastoreError::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heterogeneous_batch_message_lists_models() {
        let err = DatastoreError::HeterogeneousBatch {
            models: vec!["TestModel".to_string(), "SimpleModel".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Cannot bulk insert more than one model type: TestModel, SimpleModel"
        );
    }

    #[test]
    fn test_database_errors_are_transparent() {
        let err: DatastoreError = sqlx::Error::RowNotFound.into();
        assert!(err.is_database());
        assert_eq!(err.to_string(), sqlx::Error::RowNotFound.to_string());
    }
}
