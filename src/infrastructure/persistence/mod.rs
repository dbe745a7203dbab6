//! # Persistence Layer
//!
//! The listing store port and its adapters.
//!
//! ## Port
//!
//! - [`ListingStore`]: load and save the full listing set
//!
//! ## Adapters
//!
//! - `json_file`: JSON document, the default backend
//! - `source_file`: array literal embedded in a source file
//! - `in_memory`: for tests and ephemeral runs
//!
//! Services never hold an adapter directly; they share one
//! [`SharedListingStore`] built by [`open_store`].

pub mod atomic;
pub mod in_memory;
pub mod json_file;
pub mod shared;
pub mod source_file;
pub mod traits;

pub use in_memory::InMemoryListingStore;
pub use json_file::JsonFileListingStore;
pub use shared::SharedListingStore;
pub use source_file::SourceFileListingStore;
pub use traits::{
    ListingStore, RepositoryError, RepositoryResult, StoreSnapshot, ensure_unique_ids, next_id,
};

use crate::config::{StoreBackend, StoreSettings};

/// Builds the configured store backend.
#[must_use]
pub fn open_store(settings: &StoreSettings) -> SharedListingStore {
    let store = match settings.backend {
        StoreBackend::Json => SharedListingStore::new(JsonFileListingStore::new(&settings.path)),
        StoreBackend::SourceFile => {
            SharedListingStore::new(SourceFileListingStore::new(&settings.path))
        }
        StoreBackend::Memory => SharedListingStore::new(InMemoryListingStore::new()),
    };
    tracing::info!(backend = %store.describe(), "listing store opened");
    store
}
