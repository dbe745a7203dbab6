//! # Domain Errors
//!
//! Errors raised when listing data violates an entity rule.

use thiserror::Error;

/// Error type for domain rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required field is missing or blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field holds a value of the wrong shape.
    #[error("invalid field {field}: {message}")]
    InvalidField {
        /// Field name as it appears on the wire.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The listing fields were not a JSON object.
    #[error("listing fields must be a JSON object")]
    NotAnObject,
}

impl DomainError {
    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            DomainError::MissingField("title").to_string(),
            "missing field: title"
        );
        let err = DomainError::invalid_field("type", "expected HAVE, WANT or NEED");
        assert!(err.to_string().contains("type"));
        assert!(err.to_string().contains("HAVE"));
    }
}
