//! # Listing Catalog
//!
//! The public read path.
//!
//! Listings come from the local store while it holds any. When the store is
//! empty or unreadable the catalog reads through the [`RemoteSyncClient`]
//! instead, so the website always has something to show. Inactive listings
//! are never returned from either source.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::Listing;
use crate::domain::value_objects::{ListingId, ListingType};
use crate::infrastructure::persistence::SharedListingStore;
use crate::infrastructure::remote::RemoteSyncClient;
use serde::Deserialize;

/// Listings returned when no limit is given.
pub const DEFAULT_LIMIT: usize = 10;

/// Upper bound on any requested limit.
pub const MAX_LIMIT: usize = 100;

/// Featured listings returned when no limit is given.
pub const DEFAULT_FEATURED_LIMIT: usize = 6;

/// Filters for the public listing read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    /// Maximum number of listings.
    pub limit: Option<usize>,
    /// HAVE / WANT / NEED, any case.
    #[serde(rename = "type")]
    pub listing_type: Option<String>,
    /// Case-insensitive substring of the category.
    pub category: Option<String>,
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
}

impl ListingQuery {
    /// Sets the limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the listing type filter.
    #[must_use]
    pub fn with_type(mut self, listing_type: ListingType) -> Self {
        self.listing_type = Some(listing_type.as_str().to_string());
        self
    }

    /// Sets the category filter.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the location filter.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    fn compile(&self) -> ApplicationResult<Filter> {
        let listing_type = match non_blank(self.listing_type.as_deref()) {
            Some(text) => Some(
                text.parse::<ListingType>()
                    .map_err(|e| ApplicationError::validation(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Filter {
            listing_type,
            category: non_blank(self.category.as_deref()).map(str::to_lowercase),
            location: non_blank(self.location.as_deref()).map(str::to_lowercase),
        })
    }
}

#[derive(Debug)]
struct Filter {
    listing_type: Option<ListingType>,
    category: Option<String>,
    location: Option<String>,
}

impl Filter {
    fn matches(&self, listing: &Listing) -> bool {
        self.listing_type.is_none_or(|t| listing.listing_type == t)
            && self
                .category
                .as_deref()
                .is_none_or(|c| listing.category.to_lowercase().contains(c))
            && self
                .location
                .as_deref()
                .is_none_or(|l| listing.location.to_lowercase().contains(l))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).min(MAX_LIMIT)
}

/// Public listing queries.
#[derive(Debug, Clone)]
pub struct ListingCatalog {
    store: SharedListingStore,
    remote: RemoteSyncClient,
}

impl ListingCatalog {
    /// Creates a catalog.
    #[must_use]
    pub fn new(store: SharedListingStore, remote: RemoteSyncClient) -> Self {
        Self { store, remote }
    }

    /// Returns active listings matching `query`, in store order.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` if the type filter is not a
    /// listing type.
    pub async fn public_listings(&self, query: &ListingQuery) -> ApplicationResult<Vec<Listing>> {
        let filter = query.compile()?;
        let limit = clamp_limit(query.limit, DEFAULT_LIMIT);

        Ok(self
            .active_pool(limit)
            .await
            .into_iter()
            .filter(|listing| filter.matches(listing))
            .take(limit)
            .collect())
    }

    /// Returns featured listings, or the first active listings when none
    /// are featured.
    pub async fn featured(&self, limit: Option<usize>) -> Vec<Listing> {
        let limit = clamp_limit(limit, DEFAULT_FEATURED_LIMIT);
        let pool = self.active_pool(MAX_LIMIT).await;

        let featured: Vec<_> = pool
            .iter()
            .filter(|listing| listing.is_featured())
            .take(limit)
            .cloned()
            .collect();
        if featured.is_empty() {
            pool.into_iter().take(limit).collect()
        } else {
            featured
        }
    }

    /// Returns active listings whose title or description contains `q`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` if `q` is blank.
    pub async fn search(&self, q: &str, limit: Option<usize>) -> ApplicationResult<Vec<Listing>> {
        let q = q.trim();
        if q.is_empty() {
            return Err(ApplicationError::validation("search query must not be empty"));
        }
        let limit = clamp_limit(limit, DEFAULT_LIMIT);

        Ok(self
            .active_pool(MAX_LIMIT)
            .await
            .into_iter()
            .filter(|listing| listing.mentions(q))
            .take(limit)
            .collect())
    }

    /// Returns one active listing.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if no active listing has `id`.
    pub async fn get(&self, id: ListingId) -> ApplicationResult<Listing> {
        self.active_pool(MAX_LIMIT)
            .await
            .into_iter()
            .find(|listing| listing.id == id)
            .ok_or_else(|| ApplicationError::not_found("Listing", id.to_string()))
    }

    /// Number of listings in the local store.
    pub async fn local_count(&self) -> usize {
        self.store.load_or_empty().await.len()
    }

    async fn active_pool(&self, remote_limit: usize) -> Vec<Listing> {
        let local = self.store.load_or_empty().await;
        let listings = if local.is_empty() {
            tracing::debug!("local store empty, reading through remote chain");
            self.remote.fetch_listings(remote_limit).await
        } else {
            local
        };
        listings.into_iter().filter(Listing::is_active).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryListingStore;
    use crate::infrastructure::remote::StaticListingSource;
    use std::sync::Arc;

    fn listing(id: u64, listing_type: ListingType) -> Listing {
        Listing::new(ListingId::new(id), format!("listing {id}"), listing_type)
    }

    fn catalog(local: Vec<Listing>, remote: Vec<Listing>) -> ListingCatalog {
        ListingCatalog::new(
            SharedListingStore::new(InMemoryListingStore::with_listings(local)),
            RemoteSyncClient::new(vec![Arc::new(StaticListingSource::new(remote))]),
        )
    }

    #[tokio::test]
    async fn local_listings_are_filtered_and_limited() {
        let catalog = catalog(
            vec![
                listing(1, ListingType::Have).with_location("Portland, OR"),
                listing(2, ListingType::Want).with_active(false),
                listing(3, ListingType::Have).with_location("Eugene, OR"),
                listing(4, ListingType::Need),
            ],
            vec![listing(99, ListingType::Have)],
        );

        let all = catalog.public_listings(&ListingQuery::default()).await.unwrap();
        assert_eq!(all.iter().map(|l| l.id.get()).collect::<Vec<_>>(), vec![1, 3, 4]);

        let limited = catalog
            .public_listings(&ListingQuery::default().with_limit(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);

        let haves = catalog
            .public_listings(&ListingQuery::default().with_type(ListingType::Have).with_location("eugene"))
            .await
            .unwrap();
        assert_eq!(haves.iter().map(|l| l.id.get()).collect::<Vec<_>>(), vec![3]);
    }

    #[tokio::test]
    async fn all_inactive_local_store_does_not_fall_back() {
        let catalog = catalog(
            vec![listing(1, ListingType::Have).with_active(false)],
            vec![listing(99, ListingType::Have)],
        );
        assert!(catalog.public_listings(&ListingQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_store_reads_remote() {
        let catalog = catalog(Vec::new(), vec![listing(99, ListingType::Have)]);
        let listings = catalog.public_listings(&ListingQuery::default()).await.unwrap();
        assert_eq!(listings[0].id, ListingId::new(99));
    }

    #[tokio::test]
    async fn invalid_type_filter_is_rejected() {
        let catalog = catalog(vec![listing(1, ListingType::Have)], Vec::new());
        let query = ListingQuery {
            listing_type: Some("SELL".to_string()),
            ..ListingQuery::default()
        };
        assert!(catalog.public_listings(&query).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn limit_is_capped() {
        let many = (1..=150).map(|id| listing(id, ListingType::Have)).collect();
        let catalog = catalog(many, Vec::new());
        let listings = catalog
            .public_listings(&ListingQuery::default().with_limit(500))
            .await
            .unwrap();
        assert_eq!(listings.len(), MAX_LIMIT);
    }

    #[tokio::test]
    async fn featured_prefers_featured_then_falls_back() {
        let catalog_with = catalog(
            vec![
                listing(1, ListingType::Have),
                listing(2, ListingType::Have).with_sales_price("$750,000"),
            ],
            Vec::new(),
        );
        let featured = catalog_with.featured(None).await;
        assert_eq!(featured.iter().map(|l| l.id.get()).collect::<Vec<_>>(), vec![2]);

        let catalog_without = catalog(
            vec![listing(1, ListingType::Have), listing(2, ListingType::Want)],
            Vec::new(),
        );
        assert_eq!(catalog_without.featured(Some(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn search_matches_title_and_description() {
        let catalog = catalog(
            vec![
                listing(1, ListingType::Have).with_description("Turnkey GROW facility"),
                listing(2, ListingType::Have),
            ],
            Vec::new(),
        );
        let found = catalog.search("grow", None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(catalog.search("  ", None).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn get_hides_inactive() {
        let catalog = catalog(
            vec![
                listing(1, ListingType::Have),
                listing(2, ListingType::Have).with_active(false),
            ],
            Vec::new(),
        );
        assert_eq!(catalog.get(ListingId::new(1)).await.unwrap().id, ListingId::new(1));
        assert!(catalog.get(ListingId::new(2)).await.unwrap_err().is_not_found());
    }
}
