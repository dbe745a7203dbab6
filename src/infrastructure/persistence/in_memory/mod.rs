//! # In-Memory Store
//!
//! In-memory implementation for tests and ephemeral runs.
//!
//! ## Thread Safety
//!
//! Uses `Arc<RwLock<StoreSnapshot>>` for thread-safe access.

pub mod listing_store;

pub use listing_store::InMemoryListingStore;
