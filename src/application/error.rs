//! # Application Errors
//!
//! Error types for the application layer.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Domain(DomainError)          - Listing fields violate an entity rule
//! ├── Repository(RepositoryError)  - Store failures
//! ├── Validation(String)           - Request validation failures
//! ├── NotFound                     - No listing with that id
//! ├── Unauthorized                 - Webhook secret mismatch
//! └── InvalidPayload(String)       - Webhook body is not a listing batch
//! ```
//!
//! # Examples
//!
//! ```
//! use cannx_listings::application::error::ApplicationError;
//! use cannx_listings::infrastructure::persistence::RepositoryError;
//!
//! let err = ApplicationError::not_found("Listing", "42");
//! assert!(err.is_not_found());
//!
//! let err: ApplicationError = RepositoryError::not_found("Listing", "7").into();
//! assert!(err.is_not_found());
//! ```

use crate::domain::errors::DomainError;
use crate::infrastructure::persistence::RepositoryError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Listing fields violate an entity rule.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Store failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("not found: {resource_type} with id {id}")]
    NotFound {
        /// Type of resource.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },

    /// Shared secret missing or wrong.
    #[error("unauthorized")]
    Unauthorized,

    /// Webhook payload is not a listing batch.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    /// Creates an invalid payload error.
    #[must_use]
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload(message.into())
    }

    /// Returns true if this is a not found error, including one raised by
    /// the store.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Repository(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if the request itself was at fault.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Domain(_) | Self::InvalidPayload(_)
        )
    }

    /// Returns true if this is an authorization error.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
