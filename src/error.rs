//! Error types for query compilation.

use thiserror::Error;

/// Errors raised while building expressions or compiling them to backend queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The expression uses a construct the compiler does not translate.
    ///
    /// This signals a mismatch between the expression tree and the compiler
    /// and is never caused by production data.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// An argument could not be interpreted (e.g. a malformed decimal literal).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The compiler configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A nested predicate refers to a field without a nested mapping.
    #[error("Field '{field}' of '{type_name}' has no nested mapping")]
    UnknownNestedField { type_name: String, field: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        QueryError::UnsupportedOperation(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        QueryError::InvalidArgument(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        QueryError::InvalidConfig(msg.into())
    }

    pub fn unknown_nested_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        QueryError::UnknownNestedField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::unsupported("has_parent");
        assert_eq!(err.to_string(), "Unsupported operation: has_parent");

        let err = QueryError::unknown_nested_field("Concept", "members");
        assert_eq!(
            err.to_string(),
            "Field 'members' of 'Concept' has no nested mapping"
        );
    }
}
