//! # In-Memory Listing Store
//!
//! In-memory implementation of [`ListingStore`].
//!
//! Nothing survives a restart, which makes it suitable for unit tests and
//! for running the website against remote data only.

use crate::domain::entities::Listing;
use crate::infrastructure::persistence::traits::{ListingStore, RepositoryResult, StoreSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`ListingStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryListingStore {
    storage: Arc<RwLock<StoreSnapshot>>,
}

impl InMemoryListingStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `listings`.
    #[must_use]
    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            storage: Arc::new(RwLock::new(StoreSnapshot::new(listings, 0))),
        }
    }

    /// Returns the number of listings in the store.
    pub async fn len(&self) -> usize {
        self.storage.read().await.listings.len()
    }

    /// Returns true if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.storage.read().await.listings.is_empty()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn load_snapshot(&self) -> RepositoryResult<StoreSnapshot> {
        Ok(self.storage.read().await.clone())
    }

    async fn save_snapshot(&self, snapshot: &StoreSnapshot) -> RepositoryResult<()> {
        *self.storage.write().await = snapshot.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ListingId, ListingType};

    fn listing(id: u64) -> Listing {
        Listing::new(ListingId::new(id), format!("listing {id}"), ListingType::Have)
    }

    #[tokio::test]
    async fn new_store_is_empty() {
        let store = InMemoryListingStore::new();
        assert!(store.is_empty().await);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_replaces_content() {
        let store = InMemoryListingStore::with_listings(vec![listing(1), listing(2)]);
        assert_eq!(store.len().await, 2);

        store.save(&[listing(3)]).await.unwrap();
        assert_eq!(store.load().await.unwrap(), vec![listing(3)]);
    }

    #[tokio::test]
    async fn save_rejects_duplicate_ids() {
        let store = InMemoryListingStore::new();
        let err = store.save(&[listing(1), listing(1)]).await.unwrap_err();
        assert!(err.is_duplicate());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let store = InMemoryListingStore::new();
        let other = store.clone();
        store.save(&[listing(1)]).await.unwrap();
        assert_eq!(other.len().await, 1);
    }
}
