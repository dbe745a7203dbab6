//! # Admin Service
//!
//! Create, update, toggle and delete listings.
//!
//! Every mutation is one load-modify-save cycle under the store's write
//! lock, so concurrent admin requests and webhook pushes never interleave.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::{Listing, ListingFields};
use crate::domain::value_objects::{ListingId, Timestamp};
use crate::infrastructure::persistence::{SharedListingStore, StoreSnapshot};

/// Listing mutation use cases.
#[derive(Debug, Clone)]
pub struct AdminService {
    store: SharedListingStore,
}

impl AdminService {
    /// Creates a service over `store`.
    #[must_use]
    pub fn new(store: SharedListingStore) -> Self {
        Self { store }
    }

    /// Returns every listing, inactive ones included.
    ///
    /// An unreadable store reads as empty.
    pub async fn list_all(&self) -> Vec<Listing> {
        self.store.load_or_empty().await
    }

    /// Creates a listing from `fields`.
    ///
    /// The id is assigned from the store, `createdAt` is set to now and
    /// `isActive` defaults to true. An `id` in `fields` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Domain` if the title is blank or a field
    /// has the wrong shape, or `ApplicationError::Repository` if the store
    /// cannot be written.
    pub async fn create(&self, fields: ListingFields) -> ApplicationResult<Listing> {
        let listing = self
            .store
            .mutate(|snapshot| {
                let listing = fields.into_listing(snapshot.next_id(), Timestamp::now())?;
                snapshot.listings.push(listing.clone());
                Ok::<_, ApplicationError>(listing)
            })
            .await?;

        tracing::info!(listing_id = %listing.id, title = %listing.title, "listing created");
        Ok(listing)
    }

    /// Shallow-merges `fields` onto the listing with `id`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if no listing has `id`,
    /// `ApplicationError::Domain` if a field has the wrong shape.
    pub async fn update(&self, id: ListingId, fields: ListingFields) -> ApplicationResult<Listing> {
        let listing = self
            .store
            .mutate(|snapshot| {
                let index = find(snapshot, id)?;
                let current = snapshot
                    .listings
                    .get_mut(index)
                    .ok_or_else(|| listing_not_found(id))?;
                let updated = fields.apply_to(current)?;
                *current = updated.clone();
                Ok::<_, ApplicationError>(updated)
            })
            .await?;

        tracing::info!(listing_id = %id, "listing updated");
        Ok(listing)
    }

    /// Updates the listing named by the `id` field of `fields`.
    ///
    /// A body holding only `isActive` besides the id is a visibility toggle.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` if `id` is missing or not an
    /// integer, otherwise as [`AdminService::update`].
    pub async fn update_from_body(&self, mut fields: ListingFields) -> ApplicationResult<Listing> {
        let id = fields
            .take_id()?
            .ok_or_else(|| ApplicationError::validation("id is required"))?;
        match fields.active_toggle() {
            Some(active) => self.set_active(id, active).await,
            None => self.update(id, fields).await,
        }
    }

    /// Shows or hides a listing.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if no listing has `id`.
    pub async fn set_active(&self, id: ListingId, active: bool) -> ApplicationResult<Listing> {
        let listing = self
            .store
            .mutate(|snapshot| {
                let index = find(snapshot, id)?;
                let current = snapshot
                    .listings
                    .get_mut(index)
                    .ok_or_else(|| listing_not_found(id))?;
                current.is_active = Some(active);
                Ok::<_, ApplicationError>(current.clone())
            })
            .await?;

        tracing::info!(listing_id = %id, active, "listing visibility changed");
        Ok(listing)
    }

    /// Removes a listing and returns it.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if no listing has `id`.
    pub async fn delete(&self, id: ListingId) -> ApplicationResult<Listing> {
        let removed = self
            .store
            .mutate(|snapshot| {
                let index = find(snapshot, id)?;
                Ok::<_, ApplicationError>(snapshot.listings.remove(index))
            })
            .await?;

        tracing::info!(listing_id = %id, "listing deleted");
        Ok(removed)
    }
}

fn find(snapshot: &StoreSnapshot, id: ListingId) -> ApplicationResult<usize> {
    snapshot.position(id).ok_or_else(|| listing_not_found(id))
}

fn listing_not_found(id: ListingId) -> ApplicationError {
    ApplicationError::not_found("Listing", id.to_string())
}
