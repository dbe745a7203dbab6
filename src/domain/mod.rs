//! # Domain Layer
//!
//! Listing entity and value objects, free of I/O.
//!
//! - [`entities`]: [`entities::Listing`] and [`entities::ListingFields`]
//! - [`value_objects`]: identifiers, listing type, price, timestamp
//! - [`errors`]: domain rule violations

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use errors::{DomainError, DomainResult};
