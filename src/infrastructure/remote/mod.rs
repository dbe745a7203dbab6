//! # Remote Sync
//!
//! Read path to the remote listing origin.
//!
//! - [`RemoteSyncClient`]: ordered fallback chain, never fails
//! - [`ListingSource`]: one tier of the chain
//! - [`HttpClient`]: `reqwest` wrapper shared by the remote tiers

pub mod error;
pub mod fallback;
pub mod http_client;
pub mod sources;
pub mod sync_client;

pub use error::{RemoteError, RemoteResult};
pub use fallback::fallback_listings;
pub use http_client::HttpClient;
pub use sources::{
    ListingSource, RemoteListingSource, SourceKind, StaticListingSource, decode_listing_array,
};
pub use sync_client::{ProbeReport, ProbeStatus, RemoteSyncClient};
