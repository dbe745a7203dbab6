//! # Webhook Receiver
//!
//! Accepts listing batches pushed by the main application.
//!
//! The caller proves itself with a shared secret sent in the
//! `x-webhook-secret` header. The secret is checked before the body is
//! parsed, and nothing is written unless both checks pass.
//!
//! Two modes are supported:
//!
//! - [`WebhookMode::Replace`]: the batch becomes the whole store (an empty
//!   batch empties it)
//! - [`WebhookMode::Merge`]: listings are upserted by id and listings absent
//!   from the batch are kept

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::Listing;
use crate::domain::value_objects::Timestamp;
use crate::infrastructure::persistence::{SharedListingStore, ensure_unique_ids};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Header carrying the shared secret.
pub const SECRET_HEADER: &str = "x-webhook-secret";

/// How a pushed batch is applied to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookMode {
    /// The batch replaces the store content.
    #[default]
    Replace,
    /// The batch is upserted by id.
    Merge,
}

impl WebhookMode {
    /// Returns the mode name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for WebhookMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(format!("unknown webhook mode: {}", other)),
        }
    }
}

/// A decoded webhook body.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    /// Listings in the batch.
    pub listings: Vec<Listing>,
    /// Name of the sender, informational.
    pub source: Option<String>,
    /// Sender's timestamp, informational.
    pub timestamp: Option<String>,
}

impl WebhookPayload {
    /// Creates a payload from listings alone.
    #[must_use]
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings,
            source: None,
            timestamp: None,
        }
    }

    /// Decodes `{ listings, source, timestamp }`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidPayload` if `listings` is not an
    /// array of listings or repeats an id.
    pub fn from_json(body: Value) -> ApplicationResult<Self> {
        let Value::Object(mut body) = body else {
            return Err(ApplicationError::invalid_payload("body must be a JSON object"));
        };
        let items = match body.remove("listings") {
            Some(Value::Array(items)) => items,
            _ => return Err(ApplicationError::invalid_payload("Invalid listings data")),
        };

        let listings = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                Listing::from_json(item).map_err(|e| {
                    ApplicationError::invalid_payload(format!("listing #{}: {}", index, e))
                })
            })
            .collect::<ApplicationResult<Vec<_>>>()?;
        ensure_unique_ids(&listings)
            .map_err(|e| ApplicationError::invalid_payload(e.to_string()))?;

        Ok(Self {
            listings,
            source: text_field(body.remove("source")),
            timestamp: text_field(body.remove("timestamp")),
        })
    }
}

fn text_field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Acknowledgement returned to the sender.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookReceipt {
    /// Always true; failures are errors.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Time of processing, ISO-8601.
    pub timestamp: String,
    /// Number of listings in the batch.
    pub count: usize,
    /// Mode the batch was applied with.
    pub mode: WebhookMode,
}

/// Applies authenticated listing batches to the store.
#[derive(Debug, Clone)]
pub struct WebhookReceiver {
    store: SharedListingStore,
    secret: Option<String>,
    mode: WebhookMode,
}

impl WebhookReceiver {
    /// Creates a receiver.
    ///
    /// With no `secret` configured every request is rejected.
    #[must_use]
    pub fn new(store: SharedListingStore, secret: Option<String>, mode: WebhookMode) -> Self {
        let secret = secret.filter(|s| !s.is_empty());
        if secret.is_none() {
            tracing::warn!("webhook secret not configured, all webhook requests will be rejected");
        }
        Self {
            store,
            secret,
            mode,
        }
    }

    /// Returns the configured mode.
    #[must_use]
    pub fn mode(&self) -> WebhookMode {
        self.mode
    }

    /// Checks the provided secret.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Unauthorized` unless `provided` equals the
    /// configured secret.
    pub fn authenticate(&self, provided: Option<&str>) -> ApplicationResult<()> {
        match (self.secret.as_deref(), provided) {
            (Some(expected), Some(provided)) if expected == provided => Ok(()),
            _ => {
                tracing::warn!("webhook rejected: invalid secret");
                Err(ApplicationError::unauthorized())
            }
        }
    }

    /// Authenticates, decodes and applies a raw request body.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Unauthorized` on a secret mismatch,
    /// `ApplicationError::InvalidPayload` if the body is not a listing
    /// batch, or `ApplicationError::Repository` if the store write fails.
    pub async fn receive_raw(
        &self,
        secret: Option<&str>,
        body: &[u8],
    ) -> ApplicationResult<WebhookReceipt> {
        self.authenticate(secret)?;
        let body: Value = serde_json::from_slice(body)
            .map_err(|e| ApplicationError::invalid_payload(format!("invalid JSON: {}", e)))?;
        self.apply(WebhookPayload::from_json(body)?).await
    }

    /// Authenticates and applies an already decoded payload.
    ///
    /// # Errors
    ///
    /// As [`WebhookReceiver::receive_raw`].
    pub async fn receive(
        &self,
        secret: Option<&str>,
        payload: WebhookPayload,
    ) -> ApplicationResult<WebhookReceipt> {
        self.authenticate(secret)?;
        ensure_unique_ids(&payload.listings)
            .map_err(|e| ApplicationError::invalid_payload(e.to_string()))?;
        self.apply(payload).await
    }

    async fn apply(&self, payload: WebhookPayload) -> ApplicationResult<WebhookReceipt> {
        let count = payload.listings.len();
        tracing::info!(
            count,
            source = payload.source.as_deref().unwrap_or("unknown"),
            sent_at = payload.timestamp.as_deref().unwrap_or("unknown"),
            mode = %self.mode,
            "webhook batch received"
        );

        let mode = self.mode;
        let listings = payload.listings;
        self.store
            .mutate(|snapshot| {
                match mode {
                    WebhookMode::Replace => snapshot.replace(listings),
                    WebhookMode::Merge => {
                        for listing in listings {
                            match snapshot.position(listing.id) {
                                Some(index) => {
                                    if let Some(slot) = snapshot.listings.get_mut(index) {
                                        *slot = listing;
                                    }
                                }
                                None => snapshot.listings.push(listing),
                            }
                        }
                    }
                }
                Ok::<_, ApplicationError>(())
            })
            .await?;

        tracing::info!(count, mode = %self.mode, "webhook batch applied");
        Ok(WebhookReceipt {
            success: true,
            message: format!("Updated {} listings", count),
            timestamp: Timestamp::now().to_iso8601(),
            count,
            mode: self.mode,
        })
    }
}
