//! # CannXperts Listings
//!
//! Marketplace listing service for the CannXperts website.
//!
//! The service owns the listing data shown on the website: it persists
//! listings locally, reads through to the main application when it has
//! none, accepts listing batches pushed by the main application and exposes
//! an admin API for manual edits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ api::rest        axum router: public, admin, webhook          │
//! ├──────────────────────────────────────────────────────────────┤
//! │ application      ListingCatalog  AdminService  WebhookReceiver│
//! ├──────────────────────────────────────────────────────────────┤
//! │ infrastructure   SharedListingStore      RemoteSyncClient     │
//! │                  json / source file /    primary → secondary  │
//! │                  in-memory adapters      → bundled listings   │
//! ├──────────────────────────────────────────────────────────────┤
//! │ domain           Listing  ListingFields  value objects        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;
