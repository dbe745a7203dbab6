//! # Timestamps
//!
//! UTC instants with the ISO 8601 wire format used by the website.
//!
//! Timestamps serialize with millisecond precision and a `Z` suffix
//! (`2024-01-01T00:00:00.000Z`). Parsing is lenient: RFC 3339 strings,
//! bare dates (`2024-01-01`) and Unix milliseconds are all accepted, since
//! listing data arrives from several generations of the remote origin.
//!
//! # Examples
//!
//! ```
//! use cannx_listings::domain::value_objects::timestamp::Timestamp;
//!
//! let ts = Timestamp::parse("2024-01-01").unwrap();
//! assert_eq!(ts.to_iso8601(), "2024-01-01T00:00:00.000Z");
//! ```

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A UTC instant, as stored in `createdAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Returns `None` if the value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use cannx_listings::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::from_millis(1704067200000).unwrap();
    /// assert_eq!(ts.timestamp_millis(), 1704067200000);
    /// ```
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Creates a timestamp from Unix seconds.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
    ///
    /// Returns `None` when neither format matches.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self(Utc.from_utc_datetime(&naive)))
    }

    /// Returns the Unix timestamp in milliseconds.
    #[inline]
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Formats the timestamp as ISO 8601 with millisecond precision.
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Millis(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self::parse(&text)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: '{}'", text))),
            Raw::Millis(millis) => Self::from_millis(millis)
                .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", millis))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = Timestamp::parse("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn parses_bare_date() {
        let ts = Timestamp::parse("2024-03-15").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_710_460_800_000);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Timestamp::parse("last tuesday").is_none());
        assert!(serde_json::from_str::<Timestamp>("\"soon\"").is_err());
    }

    #[test]
    fn deserializes_from_millis() {
        let ts: Timestamp = serde_json::from_str("1704067200000").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn serializes_like_javascript_iso_string() {
        let ts = Timestamp::from_millis(1_704_067_200_123).unwrap();
        assert_eq!(
            serde_json::to_string(&ts).unwrap(),
            "\"2024-01-01T00:00:00.123Z\""
        );
    }

    #[test]
    fn date_and_midnight_compare_equal() {
        let date = Timestamp::parse("2024-01-01").unwrap();
        let midnight = Timestamp::from_secs(1_704_067_200).unwrap();
        assert_eq!(date, midnight);
        assert!(Timestamp::from_secs(0).unwrap() < date);
    }
}
