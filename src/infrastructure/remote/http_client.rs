//! # HTTP Client
//!
//! Thin `reqwest` wrapper used by the remote listing sources.
//!
//! It provides:
//! - A per-request timeout
//! - An optional bearer token on every request
//! - Mapping of transport failures and status codes onto [`RemoteError`]
//!
//! # Examples
//!
//! ```ignore
//! use cannx_listings::infrastructure::remote::HttpClient;
//!
//! let client = HttpClient::with_bearer(5000, Some("token"))?;
//! let body: serde_json::Value = client
//!     .get_with_params("https://example.com/api/marketplace", &[("limit", 10)])
//!     .await?;
//! ```

use super::error::{RemoteError, RemoteResult};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest slice of an error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// HTTP client wrapper for the remote origin.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> RemoteResult<Self> {
        Self::with_headers(timeout_ms, HeaderMap::new())
    }

    /// Creates a new HTTP client with default headers.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Internal` if the client cannot be created.
    pub fn with_headers(timeout_ms: u64, default_headers: HeaderMap) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(default_headers)
            .build()
            .map_err(|e| RemoteError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout_ms })
    }

    /// Creates a client that sends `Authorization: Bearer <token>` when a
    /// token is given.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Internal` if the token is not a valid header
    /// value or the client cannot be created.
    pub fn with_bearer(timeout_ms: u64, token: Option<&str>) -> RemoteResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RemoteError::internal("bearer token is not a valid header value"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Self::with_headers(timeout_ms, headers)
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Timeout` or `RemoteError::Connection` if the
    /// request fails, `RemoteError::UpstreamStatus` on a non-2xx status and
    /// `RemoteError::Protocol` if the body cannot be parsed.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> RemoteResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    /// Makes a GET request with query parameters and deserializes the JSON
    /// response.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get`].
    pub async fn get_with_params<T: DeserializeOwned, P: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        params: &P,
    ) -> RemoteResult<T> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> RemoteResult<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| RemoteError::protocol(format!("Failed to parse response: {}", e)))
        } else {
            let error_body = response.text().await.unwrap_or_default();
            Err(self.map_status_error(status, &error_body))
        }
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> RemoteError {
        if error.is_timeout() {
            RemoteError::timeout_with_duration("Request timed out", self.timeout_ms)
        } else if error.is_connect() {
            RemoteError::connection(format!("Connection failed: {}", error))
        } else {
            RemoteError::connection(format!("HTTP request failed: {}", error))
        }
    }

    fn map_status_error(&self, status: StatusCode, body: &str) -> RemoteError {
        let body: String = body.chars().take(MAX_ERROR_BODY).collect();
        let message = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                format!("Authentication failed: {}", body)
            }
            StatusCode::NOT_FOUND => format!("Resource not found: {}", body),
            StatusCode::TOO_MANY_REQUESTS => "Rate limit exceeded".to_string(),
            _ => body,
        };
        RemoteError::upstream_status(status.as_u16(), message)
    }
}
