//! # Remote Errors
//!
//! Error types for requests to the remote listing origin.
//!
//! None of these reach a caller of
//! [`super::RemoteSyncClient::fetch_listings`]; every error moves the
//! chain on to its next tier. They surface in logs and in the
//! test-connection probe.
//!
//! # Examples
//!
//! ```
//! use cannx_listings::infrastructure::remote::RemoteError;
//!
//! let error = RemoteError::upstream_status(503, "maintenance");
//! assert!(error.is_transient());
//! assert_eq!(error.status_code(), Some(503));
//!
//! let error = RemoteError::protocol("expected an array");
//! assert!(!error.is_transient());
//! ```

use thiserror::Error;

/// Error type for remote origin operations.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// Request timed out.
    #[error("remote timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
        /// Timeout duration in milliseconds.
        timeout_ms: Option<u64>,
    },

    /// Network or connection error.
    #[error("remote connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// The origin answered with a non-success status.
    #[error("remote returned status {status}: {message}")]
    UpstreamStatus {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response body is not a listing array.
    #[error("remote protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// The origin returned an empty listing array.
    #[error("remote returned no listings")]
    Empty,

    /// No remote origin is configured.
    #[error("remote origin not configured")]
    NotConfigured,

    /// Internal client error.
    #[error("remote internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl RemoteError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: None,
        }
    }

    /// Creates a timeout error with duration.
    #[must_use]
    pub fn timeout_with_duration(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: Some(timeout_ms),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an upstream status error.
    #[must_use]
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            status,
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the failure may clear up on its own (network
    /// trouble or a 5xx/429 from the origin).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connection { .. } => true,
            Self::UpstreamStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns the upstream status code, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;
