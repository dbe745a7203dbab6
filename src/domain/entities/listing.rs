//! # Listing Entity
//!
//! A single marketplace entry: a cannabis business or asset offered for
//! sale, sought, or looking for investment.
//!
//! Listings travel as camelCase JSON. Data written by older versions of the
//! website and the remote origin uses snake_case keys (`is_active`,
//! `sales_price`); [`Listing::from_json`] and [`ListingFields`] normalize
//! those before decoding. Keys the entity does not model (`userId`,
//! `contactInfo`, `images`, ...) are kept in [`Listing::extra`] and written
//! back unchanged.
//!
//! # Examples
//!
//! ```
//! use cannx_listings::domain::entities::Listing;
//! use cannx_listings::domain::value_objects::{ListingId, ListingType};
//!
//! let listing = Listing::new(ListingId::new(1), "Licensed dispensary", ListingType::Have)
//!     .with_location("Denver, CO")
//!     .with_sales_price("$1.2M");
//!
//! assert!(listing.is_active());
//! assert_eq!(listing.price_display(), "$1.2M");
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{ListingId, ListingType, SalesPrice, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Price above which a listing is featured on the home page.
pub const FEATURED_PRICE_THRESHOLD: u64 = 500_000;

/// A marketplace listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Unique identifier.
    pub id: ListingId,
    /// Headline.
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    /// Body text.
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    /// HAVE / WANT / NEED.
    #[serde(rename = "type", default)]
    pub listing_type: ListingType,
    /// Free-text category.
    #[serde(default, deserialize_with = "nullable_string")]
    pub category: String,
    /// Free-text location.
    #[serde(default, deserialize_with = "nullable_string")]
    pub location: String,
    /// Asking price as entered.
    #[serde(
        default,
        alias = "sales_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub sales_price: Option<SalesPrice>,
    /// Visibility flag; absent means active.
    #[serde(
        default,
        alias = "is_active",
        alias = "active",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_active: Option<bool>,
    /// Creation time. Unparsable values from older data are dropped.
    #[serde(
        default,
        alias = "created_at",
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<Timestamp>,
    /// Kind of business (dispensary, cultivation, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    /// License class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,
    /// License standing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_status: Option<String>,
    /// Equipment conveys with the sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_included: Option<bool>,
    /// Fixtures convey with the sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixtures_included: Option<bool>,
    /// Product inventory transfers with the sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_transfer: Option<bool>,
    /// The lease can be assumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_assumable: Option<bool>,
    /// Staff will stay after the sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_will_stay: Option<bool>,
    /// Where the listing was originally published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Keys not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    /// Creates an active listing with empty optional fields.
    #[must_use]
    pub fn new(id: ListingId, title: impl Into<String>, listing_type: ListingType) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            listing_type,
            category: String::new(),
            location: String::new(),
            sales_price: None,
            is_active: Some(true),
            created_at: None,
            business_type: None,
            license_type: None,
            license_status: None,
            equipment_included: None,
            fixtures_included: None,
            product_transfer: None,
            lease_assumable: None,
            staff_will_stay: None,
            source_url: None,
            extra: Map::new(),
        }
    }

    /// Decodes a listing from loosely shaped JSON.
    ///
    /// Keys are normalized to camelCase first (see [`canonical_key`]).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAnObject` if `value` is not an object and
    /// `DomainError::InvalidField` if a field has the wrong shape.
    pub fn from_json(value: Value) -> DomainResult<Self> {
        match value {
            Value::Object(map) => decode(normalize_keys(map)),
            _ => Err(DomainError::NotAnObject),
        }
    }

    /// Encodes the listing as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` if serialization fails.
    pub fn to_json(&self) -> DomainResult<Map<String, Value>> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(DomainError::NotAnObject),
            Err(e) => Err(DomainError::invalid_field("listing", e.to_string())),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the asking price.
    #[must_use]
    pub fn with_sales_price(mut self, price: impl Into<String>) -> Self {
        self.sales_price = Some(SalesPrice::new(price));
        self
    }

    /// Sets the visibility flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }

    /// Sets the creation time.
    #[must_use]
    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the business type.
    #[must_use]
    pub fn with_business_type(mut self, business_type: impl Into<String>) -> Self {
        self.business_type = Some(business_type.into());
        self
    }

    /// Sets the license type and status.
    #[must_use]
    pub fn with_license(mut self, license_type: impl Into<String>, status: impl Into<String>) -> Self {
        self.license_type = Some(license_type.into());
        self.license_status = Some(status.into());
        self
    }

    /// Returns true unless the listing was explicitly hidden.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }

    /// Returns true if the listing belongs on the featured strip.
    ///
    /// A listing is featured when its title mentions "featured" or its
    /// price exceeds [`FEATURED_PRICE_THRESHOLD`].
    #[must_use]
    pub fn is_featured(&self) -> bool {
        if self.title.to_lowercase().contains("featured") {
            return true;
        }
        self.sales_price
            .as_ref()
            .and_then(SalesPrice::numeric_value)
            .is_some_and(|amount| amount > FEATURED_PRICE_THRESHOLD)
    }

    /// Returns true if the title or description contains `needle`,
    /// ignoring case.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }

    /// Returns the price text, or "Contact for pricing".
    #[must_use]
    pub fn price_display(&self) -> &str {
        SalesPrice::display(self.sales_price.as_ref())
    }
}

/// A set of listing fields supplied by a caller.
///
/// Used both as the body of a create request and as a partial update. Keys
/// are normalized to camelCase on construction, so `is_active` and
/// `isActive` address the same field.
///
/// # Examples
///
/// ```
/// use cannx_listings::domain::entities::{Listing, ListingFields};
/// use cannx_listings::domain::value_objects::{ListingId, ListingType};
///
/// let listing = Listing::new(ListingId::new(1), "Old title", ListingType::Have)
///     .with_location("Portland, OR");
/// let patch = ListingFields::new().with_title("New title");
///
/// let updated = patch.apply_to(&listing).unwrap();
/// assert_eq!(updated.title, "New title");
/// assert_eq!(updated.location, "Portland, OR");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFields(Map<String, Value>);

impl ListingFields {
    /// Creates an empty field set.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Creates a field set from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAnObject` if `value` is not an object.
    pub fn from_value(value: Value) -> DomainResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(normalize_keys(map))),
            _ => Err(DomainError::NotAnObject),
        }
    }

    /// Sets a field, normalizing the key.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(canonical_key(key), value.into());
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.with("title", title.into())
    }

    /// Sets the visibility flag.
    #[must_use]
    pub fn with_active(self, active: bool) -> Self {
        self.with("isActive", active)
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(&canonical_key(key))
    }

    /// Returns true if no fields are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes and returns the `id` field.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` if `id` is present but is not a
    /// non-negative integer (numeric strings are accepted).
    pub fn take_id(&mut self) -> DomainResult<Option<ListingId>> {
        match self.0.remove("id") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(|id| Some(ListingId::new(id)))
                .ok_or_else(|| DomainError::invalid_field("id", "must be a non-negative integer")),
            Some(Value::String(s)) => s
                .parse::<ListingId>()
                .map(Some)
                .map_err(|_| DomainError::invalid_field("id", "must be a non-negative integer")),
            Some(_) => Err(DomainError::invalid_field("id", "must be a non-negative integer")),
        }
    }

    /// Returns the new visibility when the field set only toggles it.
    #[must_use]
    pub fn active_toggle(&self) -> Option<bool> {
        if self.0.len() != 1 {
            return None;
        }
        self.0.get("isActive").and_then(Value::as_bool)
    }

    /// Shallow-merges these fields onto `listing`.
    ///
    /// Only supplied keys change; `id` is never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` if a supplied value has the wrong
    /// shape for its field.
    pub fn apply_to(&self, listing: &Listing) -> DomainResult<Listing> {
        let mut merged = listing.to_json()?;
        for (key, value) in &self.0 {
            if key == "id" {
                continue;
            }
            merged.insert(key.clone(), value.clone());
        }
        decode(merged)
    }

    /// Builds a new listing from these fields.
    ///
    /// `id` and `createdAt` are assigned here; `isActive` defaults to true
    /// when not supplied.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingField` if the title is blank and
    /// `DomainError::InvalidField` if a value has the wrong shape.
    pub fn into_listing(self, id: ListingId, created_at: Timestamp) -> DomainResult<Listing> {
        let mut map = self.0;
        map.insert("id".to_string(), Value::from(id.get()));
        map.insert("createdAt".to_string(), Value::from(created_at.to_iso8601()));
        map.entry("isActive").or_insert(Value::Bool(true));

        let listing = decode(map)?;
        if listing.title.trim().is_empty() {
            return Err(DomainError::MissingField("title"));
        }
        Ok(listing)
    }
}

/// Returns the camelCase form of a listing key.
///
/// `snake_case` keys are converted (`sales_price` becomes `salesPrice`) and
/// the legacy `active` / `is_active` spellings map to `isActive`.
#[must_use]
pub fn canonical_key(key: &str) -> String {
    if key == "active" {
        return "isActive".to_string();
    }
    if !key.contains('_') {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn normalize_keys(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| (canonical_key(&key), value))
        .collect()
}

fn decode(map: Map<String, Value>) -> DomainResult<Listing> {
    serde_json::from_value(Value::Object(map))
        .map_err(|e| DomainError::invalid_field("listing", e.to_string()))
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Timestamp>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Listing {
        Listing::new(ListingId::new(3), "Turnkey grow facility", ListingType::Have)
            .with_description("12,000 sq ft indoor cultivation")
            .with_category("Cultivation")
            .with_location("Eugene, OR")
            .with_sales_price("$850,000")
            .with_business_type("Cultivation")
            .with_license("Tier II Producer", "Active")
    }

    #[test]
    fn absent_active_flag_means_active() {
        let mut listing = sample();
        listing.is_active = None;
        assert!(listing.is_active());
        listing.is_active = Some(false);
        assert!(!listing.is_active());
    }

    #[test]
    fn from_json_accepts_legacy_keys() {
        let listing = Listing::from_json(json!({
            "id": 9,
            "title": "Dispensary",
            "type": "HAVE",
            "is_active": false,
            "sales_price": 450000,
            "business_type": "Retail",
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(listing.id, ListingId::new(9));
        assert!(!listing.is_active());
        assert_eq!(listing.sales_price.unwrap().as_str(), "450000");
        assert_eq!(listing.business_type.as_deref(), Some("Retail"));
        assert!(listing.created_at.is_some());
        assert!(listing.extra.is_empty());
    }

    #[test]
    fn unknown_keys_round_trip_through_extra() {
        let listing = Listing::from_json(json!({
            "id": 1,
            "title": "Lab",
            "type": "NEED",
            "contactInfo": "broker@example.com",
            "images": ["a.jpg"]
        }))
        .unwrap();

        assert_eq!(listing.extra.get("contactInfo"), Some(&json!("broker@example.com")));
        let out = listing.to_json().unwrap();
        assert_eq!(out.get("images"), Some(&json!(["a.jpg"])));
    }

    #[test]
    fn null_text_fields_become_empty() {
        let listing = Listing::from_json(json!({
            "id": 1, "title": "x", "location": null, "category": null
        }))
        .unwrap();
        assert_eq!(listing.location, "");
        assert_eq!(listing.category, "");
    }

    #[test]
    fn unparsable_created_at_is_dropped() {
        let listing = Listing::from_json(json!({
            "id": 1, "title": "x", "createdAt": "sometime"
        }))
        .unwrap();
        assert!(listing.created_at.is_none());
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert_eq!(
            Listing::from_json(json!([1, 2])).unwrap_err(),
            DomainError::NotAnObject
        );
        assert!(Listing::from_json(json!({"title": "no id"})).is_err());
    }

    #[test]
    fn featured_by_title_or_price() {
        let by_title = Listing::new(ListingId::new(1), "FEATURED: vertical", ListingType::Have);
        assert!(by_title.is_featured());
        assert!(sample().is_featured());
        let cheap = sample().with_sales_price("$30K OBO");
        assert!(!cheap.is_featured());
    }

    #[test]
    fn mentions_is_case_insensitive() {
        assert!(sample().mentions("GROW"));
        assert!(sample().mentions("indoor"));
        assert!(!sample().mentions("retail"));
    }

    #[test]
    fn canonical_keys() {
        assert_eq!(canonical_key("is_active"), "isActive");
        assert_eq!(canonical_key("active"), "isActive");
        assert_eq!(canonical_key("sales_price"), "salesPrice");
        assert_eq!(canonical_key("staff_will_stay"), "staffWillStay");
        assert_eq!(canonical_key("_private"), "private");
        assert_eq!(canonical_key("title"), "title");
    }

    #[test]
    fn apply_changes_only_supplied_fields() {
        let listing = sample();
        let patch = ListingFields::new().with_title("X");
        let updated = patch.apply_to(&listing).unwrap();

        assert_eq!(updated.title, "X");
        let mut expected = listing.clone();
        expected.title = "X".to_string();
        assert_eq!(updated, expected);
    }

    #[test]
    fn apply_never_changes_id() {
        let patch = ListingFields::from_value(json!({"id": 99, "location": "Bend, OR"})).unwrap();
        let updated = patch.apply_to(&sample()).unwrap();
        assert_eq!(updated.id, ListingId::new(3));
        assert_eq!(updated.location, "Bend, OR");
    }

    #[test]
    fn apply_null_clears_optional_field() {
        let patch = ListingFields::from_value(json!({"salesPrice": null})).unwrap();
        let updated = patch.apply_to(&sample()).unwrap();
        assert!(updated.sales_price.is_none());
    }

    #[test]
    fn apply_rejects_bad_shapes() {
        let patch = ListingFields::from_value(json!({"type": "SELL"})).unwrap();
        assert!(patch.apply_to(&sample()).is_err());
    }

    #[test]
    fn into_listing_assigns_id_and_defaults_active() {
        let created_at = Timestamp::from_secs(1_700_000_000).unwrap();
        let listing = ListingFields::from_value(json!({
            "title": "Processing lab",
            "type": "WANT",
            "location": "Detroit, MI"
        }))
        .unwrap()
        .into_listing(ListingId::new(5), created_at)
        .unwrap();

        assert_eq!(listing.id, ListingId::new(5));
        assert_eq!(listing.is_active, Some(true));
        assert_eq!(listing.created_at, Some(created_at));
        assert_eq!(listing.listing_type, ListingType::Want);
    }

    #[test]
    fn into_listing_requires_title() {
        let err = ListingFields::new()
            .with("location", "Nowhere")
            .into_listing(ListingId::new(1), Timestamp::now())
            .unwrap_err();
        assert_eq!(err, DomainError::MissingField("title"));
    }

    #[test]
    fn take_id_accepts_numbers_and_numeric_strings() {
        let mut fields = ListingFields::from_value(json!({"id": 4, "title": "t"})).unwrap();
        assert_eq!(fields.take_id().unwrap(), Some(ListingId::new(4)));
        assert!(fields.get("id").is_none());

        let mut fields = ListingFields::from_value(json!({"id": "7"})).unwrap();
        assert_eq!(fields.take_id().unwrap(), Some(ListingId::new(7)));

        let mut fields = ListingFields::from_value(json!({"id": -1})).unwrap();
        assert!(fields.take_id().is_err());
    }

    #[test]
    fn active_toggle_detects_flag_only_patches() {
        let toggle = ListingFields::from_value(json!({"is_active": false})).unwrap();
        assert_eq!(toggle.active_toggle(), Some(false));

        let edit = ListingFields::from_value(json!({"isActive": true, "title": "x"})).unwrap();
        assert_eq!(edit.active_toggle(), None);
    }
}
