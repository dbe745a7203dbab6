//! # Sales Price
//!
//! Free-form asking price of a listing.
//!
//! Prices are entered by hand and arrive as numbers (`750000`), formatted
//! strings (`"$1.2M"`, `"$30K OBO"`) or sentinels (`"Contact for pricing"`).
//! The text is kept verbatim; [`SalesPrice::numeric_value`] extracts the
//! digits for the few places that compare amounts.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text shown when a listing carries no price.
pub const CONTACT_FOR_PRICING: &str = "Contact for pricing";

/// A listing's asking price, stored as entered.
///
/// # Examples
///
/// ```
/// use cannx_listings::domain::value_objects::SalesPrice;
///
/// let price = SalesPrice::new("$1,250,000");
/// assert_eq!(price.numeric_value(), Some(1_250_000));
/// assert_eq!(SalesPrice::new("Contact for pricing").numeric_value(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SalesPrice(String);

impl SalesPrice {
    /// Creates a price from its text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the price text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number formed by the digits of the price, if any.
    ///
    /// Suffixes such as `K` or `M` are not expanded; `"$30K"` yields `30`.
    #[must_use]
    pub fn numeric_value(&self) -> Option<u64> {
        let digits: String = self.0.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }

    /// Returns the display text for an optional price.
    #[must_use]
    pub fn display(price: Option<&Self>) -> &str {
        match price {
            Some(price) if !price.0.trim().is_empty() => price.as_str(),
            _ => CONTACT_FOR_PRICING,
        }
    }
}

impl fmt::Display for SalesPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SalesPrice {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for SalesPrice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Number(number) => Self(number.to_string()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn numeric_value_strips_formatting() {
        assert_eq!(SalesPrice::new("$750,000").numeric_value(), Some(750_000));
        assert_eq!(SalesPrice::new("$30K OBO").numeric_value(), Some(30));
        assert_eq!(SalesPrice::new("negotiable").numeric_value(), None);
    }

    #[test]
    fn accepts_numbers_on_the_wire() {
        let price: SalesPrice = serde_json::from_str("450000").unwrap();
        assert_eq!(price.as_str(), "450000");
        let price: SalesPrice = serde_json::from_str("\"$2M\"").unwrap();
        assert_eq!(price.as_str(), "$2M");
    }

    #[test]
    fn display_falls_back_to_contact_text() {
        assert_eq!(SalesPrice::display(None), CONTACT_FOR_PRICING);
        assert_eq!(SalesPrice::display(Some(&SalesPrice::new("  "))), CONTACT_FOR_PRICING);
        assert_eq!(SalesPrice::display(Some(&SalesPrice::new("$10"))), "$10");
    }
}
