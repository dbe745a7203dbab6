//! # Listing Sources
//!
//! The tiers of the remote sync chain.
//!
//! - [`RemoteListingSource`]: `GET {url}?limit=N` against the remote origin
//! - [`StaticListingSource`]: listings bundled with the binary

use super::error::{RemoteError, RemoteResult};
use super::fallback::fallback_listings;
use super::http_client::HttpClient;
use crate::domain::entities::Listing;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Where a source gets its listings from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// An HTTP endpoint of the remote origin.
    Remote,
    /// Data compiled into the binary.
    Static,
}

/// One tier of the fallback chain.
#[async_trait]
pub trait ListingSource: Send + Sync + fmt::Debug {
    /// Tier name used in logs.
    fn name(&self) -> &str;

    /// Returns the kind of this source.
    fn kind(&self) -> SourceKind;

    /// Fetches up to `limit` listings.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] when this tier has nothing usable; the
    /// chain then moves on to the next tier.
    async fn fetch(&self, limit: usize) -> RemoteResult<Vec<Listing>>;
}

/// Decodes a remote response body.
///
/// Any non-empty array is accepted. Elements that do not decode as a
/// listing are skipped with a warning; unknown keys are kept on the rest.
///
/// # Errors
///
/// Returns `RemoteError::Empty` for an empty array, and
/// `RemoteError::Protocol` if the body is not an array or no element
/// decodes.
pub fn decode_listing_array(body: Value) -> RemoteResult<Vec<Listing>> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(RemoteError::protocol(format!(
                "expected a listing array, got {}",
                json_kind(&other)
            )));
        }
    };
    if items.is_empty() {
        return Err(RemoteError::Empty);
    }

    let total = items.len();
    let listings: Vec<Listing> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match Listing::from_json(item) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping undecodable remote listing");
                None
            }
        })
        .collect();

    if listings.is_empty() {
        return Err(RemoteError::protocol(format!(
            "none of {} elements decoded as a listing",
            total
        )));
    }
    Ok(listings)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Remote origin endpoint returning a listing array.
#[derive(Debug, Clone)]
pub struct RemoteListingSource {
    name: String,
    url: String,
    client: HttpClient,
}

impl RemoteListingSource {
    /// Creates a source for `url`.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>, client: HttpClient) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client,
        }
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ListingSource for RemoteListingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn fetch(&self, limit: usize) -> RemoteResult<Vec<Listing>> {
        let body: Value = self
            .client
            .get_with_params(&self.url, &[("limit", limit)])
            .await?;
        decode_listing_array(body)
    }
}

/// Fixed listing set served without any I/O.
#[derive(Debug, Clone)]
pub struct StaticListingSource {
    listings: Vec<Listing>,
}

impl StaticListingSource {
    /// Creates a source serving `listings`.
    #[must_use]
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    /// Creates a source serving the listings bundled with the binary.
    #[must_use]
    pub fn bundled() -> Self {
        Self::new(fallback_listings())
    }
}

#[async_trait]
impl ListingSource for StaticListingSource {
    fn name(&self) -> &str {
        "static"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Static
    }

    async fn fetch(&self, limit: usize) -> RemoteResult<Vec<Listing>> {
        Ok(self.listings.iter().take(limit).cloned().collect())
    }
}
