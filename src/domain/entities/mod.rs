//! # Domain Entities
//!
//! - [`Listing`]: a marketplace listing, the only entity
//! - [`ListingFields`]: caller-supplied fields for create and partial update

pub mod listing;

pub use listing::{FEATURED_PRICE_THRESHOLD, Listing, ListingFields, canonical_key};
