//! # Shared Store Handle
//!
//! The single store instance handed to every service.
//!
//! Mutations run under one write lock for their whole load-modify-save
//! cycle, so two writers in this process cannot lose each other's updates.
//! Reads do not take the lock; with the file backends they always see a
//! complete snapshot because saves replace the file atomically.

use super::traits::{ListingStore, RepositoryError, RepositoryResult, StoreSnapshot, ensure_unique_ids};
use crate::domain::entities::Listing;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cloneable handle over a [`ListingStore`].
#[derive(Debug, Clone)]
pub struct SharedListingStore {
    inner: Arc<dyn ListingStore>,
    write_lock: Arc<Mutex<()>>,
}

impl SharedListingStore {
    /// Wraps a store.
    #[must_use]
    pub fn new(store: impl ListingStore + 'static) -> Self {
        Self::from_arc(Arc::new(store))
    }

    /// Wraps a store that is already shared.
    #[must_use]
    pub fn from_arc(store: Arc<dyn ListingStore>) -> Self {
        Self {
            inner: store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the backend description.
    #[must_use]
    pub fn describe(&self) -> String {
        self.inner.describe()
    }

    /// Loads the listing set.
    ///
    /// # Errors
    ///
    /// Propagates `RepositoryError::Corrupt` and I/O failures; most callers
    /// want [`SharedListingStore::load_or_empty`].
    pub async fn load(&self) -> RepositoryResult<Vec<Listing>> {
        self.inner.load().await
    }

    /// Loads the listing set, treating an unreadable store as empty.
    pub async fn load_or_empty(&self) -> Vec<Listing> {
        match self.inner.load().await {
            Ok(listings) => listings,
            Err(e) => {
                log_load_failure(&self.describe(), &e);
                Vec::new()
            }
        }
    }

    /// Runs a load-modify-save cycle under the write lock.
    ///
    /// A corrupt store is replaced by an empty snapshot before `operation`
    /// runs. Nothing is saved when `operation` fails.
    ///
    /// # Errors
    ///
    /// Returns the error of `operation`, `RepositoryError::Duplicate` if the
    /// modified set repeats an id, or any I/O failure of the backend.
    pub async fn mutate<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = match self.inner.load_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_corrupt() => {
                log_load_failure(&self.describe(), &e);
                StoreSnapshot::default()
            }
            Err(e) => return Err(e.into()),
        };

        let result = operation(&mut snapshot)?;
        snapshot.observe_ids();
        ensure_unique_ids(&snapshot.listings)?;
        self.inner.save_snapshot(&snapshot).await?;
        Ok(result)
    }
}

fn log_load_failure(backend: &str, error: &RepositoryError) {
    if error.is_corrupt() {
        tracing::warn!(backend, error = %error, "listing store is corrupt, treating as empty");
    } else {
        tracing::error!(backend, error = %error, "listing store could not be read, treating as empty");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ListingId, ListingType};
    use crate::infrastructure::persistence::{InMemoryListingStore, JsonFileListingStore};

    fn listing(id: u64) -> Listing {
        Listing::new(ListingId::new(id), format!("listing {id}"), ListingType::Have)
    }

    #[tokio::test]
    async fn mutate_saves_on_success() {
        let store = SharedListingStore::new(InMemoryListingStore::new());
        let id = store
            .mutate(|snapshot| {
                let id = snapshot.next_id();
                snapshot.listings.push(listing(id.get()));
                Ok::<_, RepositoryError>(id)
            })
            .await
            .unwrap();

        assert_eq!(id, ListingId::new(1));
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mutate_saves_nothing_on_failure() {
        let store = SharedListingStore::new(InMemoryListingStore::with_listings(vec![listing(1)]));
        let result = store
            .mutate(|snapshot| {
                snapshot.listings.clear();
                Err::<(), _>(RepositoryError::not_found("Listing", "9"))
            })
            .await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mutate_rejects_duplicate_ids() {
        let store = SharedListingStore::new(InMemoryListingStore::with_listings(vec![listing(1)]));
        let err = store
            .mutate(|snapshot| {
                snapshot.listings.push(listing(1));
                Ok::<_, RepositoryError>(())
            })
            .await
            .unwrap_err();

        assert!(err.is_duplicate());
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_store_reads_as_empty_and_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");
        std::fs::write(&path, "[{broken").unwrap();
        let store = SharedListingStore::new(JsonFileListingStore::new(&path));

        assert!(store.load().await.unwrap_err().is_corrupt());
        assert!(store.load_or_empty().await.is_empty());

        store
            .mutate(|snapshot| {
                snapshot.listings.push(listing(1));
                Ok::<_, RepositoryError>(())
            })
            .await
            .unwrap();
        assert_eq!(store.load().await.unwrap(), vec![listing(1)]);
    }

    #[tokio::test]
    async fn concurrent_mutations_do_not_lose_updates() {
        let store = SharedListingStore::new(InMemoryListingStore::new());

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .mutate(|snapshot| {
                            let id = snapshot.next_id();
                            snapshot.listings.push(listing(id.get()));
                            Ok::<_, RepositoryError>(())
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let listings = store.load().await.unwrap();
        assert_eq!(listings.len(), 20);
        assert_eq!(listings.iter().map(|l| l.id.get()).max(), Some(20));
    }
}
