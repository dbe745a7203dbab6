//! # Domain Enums
//!
//! Enumeration types for domain concepts.
//!
//! - [`ListingType`] - What the lister is doing: selling, seeking or raising
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits. Deserialization goes through
//! `FromStr`, so it is case-insensitive.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace listing type.
///
/// Serialized in upper case (`HAVE`, `WANT`, `NEED`), the format used by the
/// remote origin and the webhook payloads. Any casing is accepted on input.
///
/// # Examples
///
/// ```
/// use cannx_listings::domain::value_objects::enums::ListingType;
///
/// let have = ListingType::Have;
/// assert_eq!(have.to_string(), "HAVE");
/// assert_eq!(have.label(), "For Sale");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListingType {
    /// A business or asset offered for sale.
    #[default]
    Have,
    /// Someone seeking a business or asset.
    Want,
    /// Someone seeking investment.
    Need,
}

impl ListingType {
    /// Returns the wire value.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Have => "HAVE",
            Self::Want => "WANT",
            Self::Need => "NEED",
        }
    }

    /// Returns the human-readable label shown on the website.
    ///
    /// # Examples
    ///
    /// ```
    /// use cannx_listings::domain::value_objects::enums::ListingType;
    ///
    /// assert_eq!(ListingType::Want.label(), "Seeking");
    /// assert_eq!(ListingType::Need.label(), "Investment");
    /// ```
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Have => "For Sale",
            Self::Want => "Seeking",
            Self::Need => "Investment",
        }
    }

    /// Returns true if the listing offers something for sale.
    #[inline]
    #[must_use]
    pub const fn is_offer(self) -> bool {
        matches!(self, Self::Have)
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HAVE" => Ok(Self::Have),
            "WANT" => Ok(Self::Want),
            "NEED" => Ok(Self::Need),
            _ => Err(ParseEnumError::InvalidValue("ListingType", s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ListingType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Error returned when parsing an enum from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEnumError {
    /// The provided string value is not valid for the enum.
    InvalidValue(&'static str, String),
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue(enum_name, value) => {
                write!(f, "invalid {} value: '{}'", enum_name, value)
            }
        }
    }
}

impl std::error::Error for ParseEnumError {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("have".parse::<ListingType>().unwrap(), ListingType::Have);
        assert_eq!(" Want ".parse::<ListingType>().unwrap(), ListingType::Want);
        assert_eq!("NEED".parse::<ListingType>().unwrap(), ListingType::Need);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "SELL".parse::<ListingType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid ListingType value: 'SELL'");
    }

    #[test]
    fn serde_uses_upper_case() {
        let json = serde_json::to_string(&ListingType::Need).unwrap();
        assert_eq!(json, "\"NEED\"");
        let parsed: ListingType = serde_json::from_str("\"WANT\"").unwrap();
        assert_eq!(parsed, ListingType::Want);
    }

    #[test]
    fn deserialize_accepts_any_case() {
        let parsed: ListingType = serde_json::from_str("\"have\"").unwrap();
        assert_eq!(parsed, ListingType::Have);
        let parsed: ListingType = serde_json::from_str("\"Need\"").unwrap();
        assert_eq!(parsed, ListingType::Need);

        let err = serde_json::from_str::<ListingType>("\"SELL\"").unwrap_err();
        assert!(err.to_string().contains("invalid ListingType value"));
    }

    #[test]
    fn labels() {
        assert_eq!(ListingType::Have.label(), "For Sale");
        assert!(ListingType::Have.is_offer());
        assert!(!ListingType::Need.is_offer());
    }
}
