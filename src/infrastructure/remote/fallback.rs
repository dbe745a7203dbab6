//! Listings bundled with the binary, served when every remote tier fails.

use crate::domain::entities::Listing;
use crate::domain::value_objects::{ListingId, ListingType};
use serde_json::Value;

/// Returns the bundled fallback listings, in display order.
#[must_use]
pub fn fallback_listings() -> Vec<Listing> {
    vec![
        Listing::new(ListingId::new(307), "OLCC Processor License", ListingType::Have)
            .with_description(
                "Rare processor license available. Must show proof of approved Land Use \
                 Compatibility Statement for location.",
            )
            .with_category("License")
            .with_location("Oregon, USA")
            .with_sales_price("$30K OBO"),
        turnkey(
            Listing::new(ListingId::new(308), "Retail Dispensary - Salem", ListingType::Have)
                .with_description(
                    "Operational retail dispensary. Includes all fixtures, equipment, and \
                     product transfer. Staff interested in staying.",
                )
                .with_category("Retail")
                .with_location("Salem, Oregon")
                .with_sales_price("$300K"),
        ),
        with_contact(
            Listing::new(ListingId::new(309), "Retail License - Milwaukee", ListingType::Have)
                .with_description(
                    "Dispensary license registered in Milwaukee Oregon. Location not included \
                     with license. Contact seller directly.",
                )
                .with_category("License")
                .with_location("Oregon, USA"),
            "970-389-4548",
        ),
        Listing::new(ListingId::new(310), "Rebel Spirit Cannabis Farm", ListingType::Have)
            .with_description(
                "Renowned cannabis farm with award-winning nationally trademarked brand. \
                 Established operation with significant growth potential.",
            )
            .with_category("Farm & Brand")
            .with_location("Lane County, Oregon"),
        Listing::new(ListingId::new(311), "Featured: OLCC Retail Store - Eugene", ListingType::Have)
            .with_description(
                "Operational and profitable OLCC retail store in unique Eugene location. Popular \
                 area with year-round events and high patron traffic.",
            )
            .with_category("4000 SF Store")
            .with_location("Eugene, Oregon"),
    ]
}

fn turnkey(mut listing: Listing) -> Listing {
    listing.equipment_included = Some(true);
    listing.fixtures_included = Some(true);
    listing.product_transfer = Some(true);
    listing.staff_will_stay = Some(true);
    listing
}

fn with_contact(mut listing: Listing, contact: &str) -> Listing {
    listing
        .extra
        .insert("contactInfo".to_string(), Value::from(contact));
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fallback_listings_are_active_with_unique_ids() {
        let listings = fallback_listings();
        assert_eq!(listings.len(), 5);
        assert!(listings.iter().all(Listing::is_active));

        let ids: HashSet<_> = listings.iter().map(|l| l.id).collect();
        assert_eq!(ids.len(), listings.len());
    }

    #[test]
    fn one_fallback_listing_is_featured() {
        let featured: Vec<_> = fallback_listings()
            .into_iter()
            .filter(Listing::is_featured)
            .collect();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].id, ListingId::new(311));
    }
}
