//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! - [`ListingId`]: numeric listing identifier
//! - [`ListingType`]: HAVE / WANT / NEED
//! - [`SalesPrice`]: free-form asking price
//! - [`Timestamp`]: UTC timestamp with the website's ISO 8601 format

pub mod enums;
pub mod ids;
pub mod sales_price;
pub mod timestamp;

pub use enums::{ListingType, ParseEnumError};
pub use ids::ListingId;
pub use sales_price::SalesPrice;
pub use timestamp::Timestamp;
