//! # Store Traits
//!
//! Port definition for listing persistence.
//!
//! The whole listing set is persisted as one unit: every write replaces the
//! previous content in full, and every mutation is a load-modify-save cycle
//! (see [`super::SharedListingStore`]).
//!
//! # Examples
//!
//! ```ignore
//! use cannx_listings::infrastructure::persistence::ListingStore;
//!
//! async fn count_active(store: &impl ListingStore) -> usize {
//!     store.load().await.unwrap_or_default().iter().filter(|l| l.is_active()).count()
//! }
//! ```

use crate::domain::entities::Listing;
use crate::domain::value_objects::ListingId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Two entities share an identifier.
    #[error("Duplicate entity: {entity_type} with id {id} already exists")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// The persisted representation cannot be parsed as a listing array.
    #[error("Corrupt store: {0}")]
    Corrupt(String),

    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a corrupt store error.
    #[must_use]
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a duplicate error.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Returns true if the store content could not be parsed.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}

/// Result type for store operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Returns `max(existing ids ∪ {0}) + 1`.
///
/// # Examples
///
/// ```
/// use cannx_listings::domain::entities::Listing;
/// use cannx_listings::domain::value_objects::{ListingId, ListingType};
/// use cannx_listings::infrastructure::persistence::next_id;
///
/// assert_eq!(next_id(&[]), ListingId::new(1));
///
/// let listings = vec![
///     Listing::new(ListingId::new(4), "a", ListingType::Have),
///     Listing::new(ListingId::new(2), "b", ListingType::Want),
/// ];
/// assert_eq!(next_id(&listings), ListingId::new(5));
/// ```
#[must_use]
pub fn next_id(listings: &[Listing]) -> ListingId {
    listings
        .iter()
        .map(|listing| listing.id)
        .max()
        .unwrap_or_default()
        .next()
}

/// Checks that no two listings share an id.
///
/// # Errors
///
/// Returns `RepositoryError::Duplicate` naming the first repeated id.
pub fn ensure_unique_ids(listings: &[Listing]) -> RepositoryResult<()> {
    let mut seen = HashSet::with_capacity(listings.len());
    for listing in listings {
        if !seen.insert(listing.id) {
            return Err(RepositoryError::duplicate("Listing", listing.id.to_string()));
        }
    }
    Ok(())
}

/// Full persisted state of a store.
///
/// Besides the listings it records the highest id ever assigned, so an id
/// freed by a delete is not handed out again even when the deleted listing
/// was the newest one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Highest id ever stored.
    #[serde(default)]
    pub last_id: u64,
    /// Listings in insertion order.
    #[serde(default)]
    pub listings: Vec<Listing>,
}

impl StoreSnapshot {
    /// Creates a snapshot, raising `last_id` to cover every listing.
    #[must_use]
    pub fn new(listings: Vec<Listing>, last_id: u64) -> Self {
        let mut snapshot = Self { last_id, listings };
        snapshot.observe_ids();
        snapshot
    }

    /// Returns the id the next created listing receives.
    ///
    /// This is [`next_id`] over the current listings, raised past any id
    /// previously assigned.
    #[must_use]
    pub fn next_id(&self) -> ListingId {
        next_id(&self.listings).max(ListingId::new(self.last_id).next())
    }

    /// Replaces the listings, keeping the id high-water mark.
    pub fn replace(&mut self, listings: Vec<Listing>) {
        self.listings = listings;
        self.observe_ids();
    }

    /// Raises `last_id` to the largest id present.
    pub fn observe_ids(&mut self) {
        let max = self.listings.iter().map(|l| l.id.get()).max().unwrap_or(0);
        self.last_id = self.last_id.max(max);
    }

    /// Returns the position of a listing.
    #[must_use]
    pub fn position(&self, id: ListingId) -> Option<usize> {
        self.listings.iter().position(|listing| listing.id == id)
    }
}

/// Persistence port for the listing set.
///
/// Implementations persist the full [`StoreSnapshot`]; `load`, `save` and
/// `next_id` are derived from it.
///
/// A store whose backing data does not exist yet is empty, not corrupt.
#[async_trait]
pub trait ListingStore: Send + Sync + fmt::Debug {
    /// Reads the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Corrupt` if the persisted representation is
    /// not a well-formed listing array, `RepositoryError::Io` if it cannot be
    /// read.
    async fn load_snapshot(&self) -> RepositoryResult<StoreSnapshot>;

    /// Persists a snapshot, replacing prior content in full.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` or `RepositoryError::Serialization` if
    /// the snapshot cannot be written.
    async fn save_snapshot(&self, snapshot: &StoreSnapshot) -> RepositoryResult<()>;

    /// Short description of the backend for logs and health output.
    fn describe(&self) -> String;

    /// Returns the current listing set.
    ///
    /// # Errors
    ///
    /// Same as [`ListingStore::load_snapshot`].
    async fn load(&self) -> RepositoryResult<Vec<Listing>> {
        Ok(self.load_snapshot().await?.listings)
    }

    /// Replaces the listing set.
    ///
    /// The id high-water mark is carried over from the current snapshot
    /// when it can be read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if two listings share an id, or
    /// any error of [`ListingStore::save_snapshot`].
    async fn save(&self, listings: &[Listing]) -> RepositoryResult<()> {
        ensure_unique_ids(listings)?;
        let last_id = self
            .load_snapshot()
            .await
            .map(|snapshot| snapshot.last_id)
            .unwrap_or(0);
        self.save_snapshot(&StoreSnapshot::new(listings.to_vec(), last_id))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ListingType;

    fn listing(id: u64) -> Listing {
        Listing::new(ListingId::new(id), format!("listing {id}"), ListingType::Have)
    }

    mod repository_error {
        use super::*;

        #[test]
        fn not_found_error() {
            let err = RepositoryError::not_found("Listing", "12");
            assert!(err.is_not_found());
            assert!(!err.is_duplicate());
            assert!(err.to_string().contains("not found"));
            assert!(err.to_string().contains("12"));
        }

        #[test]
        fn corrupt_error() {
            let err = RepositoryError::corrupt("expected array");
            assert!(err.is_corrupt());
            assert!(err.to_string().contains("Corrupt"));
        }

        #[test]
        fn io_error() {
            let err = RepositoryError::io("permission denied");
            assert!(!err.is_corrupt());
            assert!(err.to_string().contains("permission denied"));
        }
    }

    #[test]
    fn next_id_of_empty_is_one() {
        assert_eq!(next_id(&[]), ListingId::new(1));
    }

    #[test]
    fn next_id_uses_max_not_len() {
        let listings = vec![listing(1), listing(7), listing(3)];
        assert_eq!(next_id(&listings), ListingId::new(8));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ensure_unique_ids(&[listing(1), listing(2), listing(1)]).unwrap_err();
        assert!(err.is_duplicate());
        assert!(ensure_unique_ids(&[listing(1), listing(2)]).is_ok());
    }

    #[test]
    fn snapshot_never_reuses_deleted_ids() {
        let mut snapshot = StoreSnapshot::new(vec![listing(1)], 0);
        assert_eq!(snapshot.last_id, 1);

        snapshot.replace(Vec::new());
        assert_eq!(snapshot.next_id(), ListingId::new(2));
    }

    #[test]
    fn snapshot_position() {
        let snapshot = StoreSnapshot::new(vec![listing(4), listing(9)], 0);
        assert_eq!(snapshot.position(ListingId::new(9)), Some(1));
        assert_eq!(snapshot.position(ListingId::new(5)), None);
    }

    #[test]
    fn snapshot_json_shape() {
        let snapshot = StoreSnapshot::new(vec![listing(2)], 5);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["lastId"], 5);
        assert_eq!(json["listings"][0]["id"], 2);
    }
}
