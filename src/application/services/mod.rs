//! # Application Services
//!
//! Use cases over the listing store.
//!
//! - [`AdminService`]: create, update, toggle and delete listings
//! - [`WebhookReceiver`]: apply listing batches pushed by the main app
//! - [`ListingCatalog`]: public reads with remote fallback

pub mod admin;
pub mod catalog;
pub mod webhook;

pub use admin::AdminService;
pub use catalog::{DEFAULT_FEATURED_LIMIT, DEFAULT_LIMIT, ListingCatalog, ListingQuery, MAX_LIMIT};
pub use webhook::{SECRET_HEADER, WebhookMode, WebhookPayload, WebhookReceipt, WebhookReceiver};
