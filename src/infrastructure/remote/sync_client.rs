//! # Remote Sync Client
//!
//! Reads listings from the remote origin, falling back tier by tier.
//!
//! The chain is tried in order, one attempt per tier:
//!
//! 1. primary path (`/api/marketplace?limit=N`)
//! 2. secondary path, when configured
//! 3. listings bundled with the binary
//!
//! A tier that times out, fails to connect, answers non-2xx, returns
//! malformed JSON or returns an empty array is skipped.
//!
//! # Examples
//!
//! ```ignore
//! use cannx_listings::infrastructure::remote::{RemoteSyncClient, StaticListingSource};
//! use std::sync::Arc;
//!
//! let client = RemoteSyncClient::new(vec![Arc::new(StaticListingSource::bundled())]);
//! let listings = client.fetch_listings(3).await;
//! assert_eq!(listings.len(), 3);
//! ```

use super::error::{RemoteError, RemoteResult};
use super::http_client::HttpClient;
use super::sources::{ListingSource, RemoteListingSource, SourceKind, StaticListingSource};
use crate::config::RemoteSettings;
use crate::domain::entities::Listing;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Number of listings requested by [`RemoteSyncClient::probe`].
pub const PROBE_LIMIT: usize = 6;

/// Number of listings echoed back in a probe report.
const PROBE_SAMPLE: usize = 2;

/// Outcome of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// The primary tier answered with a listing array.
    Success,
    /// The primary tier failed.
    Error,
}

/// Result of a connection test against the primary remote tier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    /// Outcome.
    pub status: ProbeStatus,
    /// Name of the probed tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Number of listings returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Title of the first listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_title: Option<String>,
    /// First listings of the response.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sample: Vec<Listing>,
    /// Upstream status code on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Round-trip time in milliseconds.
    pub elapsed_ms: u64,
}

impl ProbeReport {
    fn success(source: &str, listings: Vec<Listing>, elapsed_ms: u64) -> Self {
        Self {
            status: ProbeStatus::Success,
            source: Some(source.to_string()),
            count: Some(listings.len()),
            first_title: Some(
                listings
                    .first()
                    .map_or_else(|| "No listings".to_string(), |l| l.title.clone()),
            ),
            sample: listings.into_iter().take(PROBE_SAMPLE).collect(),
            code: None,
            message: None,
            elapsed_ms,
        }
    }

    fn failure(source: Option<&str>, error: &RemoteError, elapsed_ms: u64) -> Self {
        Self {
            status: ProbeStatus::Error,
            source: source.map(str::to_string),
            count: None,
            first_title: None,
            sample: Vec::new(),
            code: error.status_code(),
            message: Some(error.to_string()),
            elapsed_ms,
        }
    }

    /// Returns true if the probe succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ProbeStatus::Success
    }
}

/// Ordered chain of listing sources.
#[derive(Debug, Clone)]
pub struct RemoteSyncClient {
    sources: Vec<Arc<dyn ListingSource>>,
}

impl RemoteSyncClient {
    /// Creates a client over an explicit chain.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn ListingSource>>) -> Self {
        Self { sources }
    }

    /// Builds the chain from configuration.
    ///
    /// Without a `base_url` the chain holds only the bundled listings.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Internal` if the HTTP client cannot be built.
    pub fn from_settings(settings: &RemoteSettings) -> RemoteResult<Self> {
        let mut sources: Vec<Arc<dyn ListingSource>> = Vec::with_capacity(3);

        if let Some(base_url) = settings.base_url.as_deref() {
            let client =
                HttpClient::with_bearer(settings.timeout_ms, settings.bearer_token.as_deref())?;
            sources.push(Arc::new(RemoteListingSource::new(
                "primary",
                join_url(base_url, &settings.primary_path),
                client.clone(),
            )));
            if let Some(path) = settings.secondary_path.as_deref() {
                sources.push(Arc::new(RemoteListingSource::new(
                    "secondary",
                    join_url(base_url, path),
                    client,
                )));
            }
        } else {
            tracing::info!("no remote origin configured, serving bundled listings only");
        }

        sources.push(Arc::new(StaticListingSource::bundled()));
        Ok(Self::new(sources))
    }

    /// Returns the tier names in order.
    #[must_use]
    pub fn tiers(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Returns listings from the first tier that has any.
    ///
    /// Never fails; when every tier fails the result is empty.
    pub async fn fetch_listings(&self, limit: usize) -> Vec<Listing> {
        for source in &self.sources {
            match source.fetch(limit).await {
                Ok(listings) => {
                    tracing::info!(tier = source.name(), count = listings.len(), "listings fetched");
                    return listings;
                }
                Err(e) => {
                    tracing::warn!(tier = source.name(), error = %e, "listing tier failed, falling through");
                }
            }
        }

        tracing::error!("every listing tier failed");
        Vec::new()
    }

    /// Sends one request to the first remote tier and reports the result.
    pub async fn probe(&self) -> ProbeReport {
        let started = Instant::now();
        let Some(source) = self.sources.iter().find(|s| s.kind() == SourceKind::Remote) else {
            return ProbeReport::failure(None, &RemoteError::NotConfigured, 0);
        };

        let result = source.fetch(PROBE_LIMIT).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match result {
            Ok(listings) => ProbeReport::success(source.name(), listings, elapsed_ms),
            Err(RemoteError::Empty) => ProbeReport::success(source.name(), Vec::new(), elapsed_ms),
            Err(e) => {
                tracing::warn!(tier = source.name(), error = %e, "connection probe failed");
                ProbeReport::failure(Some(source.name()), &e, elapsed_ms)
            }
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ListingId, ListingType};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Failing(&'static str);

    #[async_trait]
    impl ListingSource for Failing {
        fn name(&self) -> &str {
            self.0
        }

        fn kind(&self) -> SourceKind {
            SourceKind::Remote
        }

        async fn fetch(&self, _limit: usize) -> RemoteResult<Vec<Listing>> {
            Err(RemoteError::upstream_status(500, "boom"))
        }
    }

    fn settings(base_url: Option<&str>, secondary: Option<&str>) -> RemoteSettings {
        RemoteSettings {
            base_url: base_url.map(str::to_string),
            primary_path: "/api/marketplace".to_string(),
            secondary_path: secondary.map(str::to_string),
            bearer_token: None,
            timeout_ms: 1000,
        }
    }

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(join_url("https://a.io/", "/api/x"), "https://a.io/api/x");
        assert_eq!(join_url("https://a.io", "api/x"), "https://a.io/api/x");
    }

    #[test]
    fn chain_from_settings() {
        let client = RemoteSyncClient::from_settings(&settings(None, None)).unwrap();
        assert_eq!(client.tiers(), vec!["static"]);

        let client = RemoteSyncClient::from_settings(&settings(
            Some("https://origin.example"),
            Some("/api/admin/listings"),
        ))
        .unwrap();
        assert_eq!(client.tiers(), vec!["primary", "secondary", "static"]);
    }

    #[tokio::test]
    async fn failing_tiers_fall_through_to_static() {
        let only = Listing::new(ListingId::new(9), "Static", ListingType::Want);
        let client = RemoteSyncClient::new(vec![
            Arc::new(Failing("primary")),
            Arc::new(Failing("secondary")),
            Arc::new(StaticListingSource::new(vec![only.clone()])),
        ]);

        assert_eq!(client.fetch_listings(10).await, vec![only]);
    }

    #[tokio::test]
    async fn empty_chain_yields_nothing() {
        let client = RemoteSyncClient::new(vec![Arc::new(Failing("primary"))]);
        assert!(client.fetch_listings(10).await.is_empty());
    }

    #[tokio::test]
    async fn probe_reports_failure_of_primary() {
        let client = RemoteSyncClient::new(vec![
            Arc::new(Failing("primary")),
            Arc::new(StaticListingSource::bundled()),
        ]);
        let report = client.probe().await;

        assert!(!report.is_success());
        assert_eq!(report.code, Some(500));
        assert_eq!(report.source.as_deref(), Some("primary"));
    }

    #[tokio::test]
    async fn probe_without_remote_is_not_configured() {
        let client = RemoteSyncClient::new(vec![Arc::new(StaticListingSource::bundled())]);
        let report = client.probe().await;

        assert!(!report.is_success());
        assert!(report.message.unwrap().contains("not configured"));
    }
}
