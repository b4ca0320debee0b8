use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Base URL of the retailer's product page; the listing ID is appended.
pub const PRODUCT_DETAIL_URL: &str = "https://uk.webuy.com/product-detail?id=";

/// A single item for sale, rationalised from one search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Coarse grouping key derived from the title, e.g. `"Lenovo X390"`.
    pub model: String,
    /// Full listing title.
    pub name: String,
    pub category: String,
    /// Opaque retailer ID. The last character is the condition grade.
    pub id: String,
    pub price: Decimal,
    /// Offer price when selling this item to the retailer for cash.
    pub cash_price: Decimal,
    /// Offer price when trading this item in for store credit.
    pub exchange_price: Decimal,
    /// Store names as reported by the search endpoint (aliases applied).
    pub store_names: Vec<String>,
    /// Stores holding the item, filled in after aggregation.
    #[serde(default)]
    pub stores: Vec<StoreDistance>,
}

impl Listing {
    /// Returns `true` if every whitespace-separated word of at least one
    /// query is a substring of the lower-cased name and model.
    ///
    /// Containment is plain substring matching: `"x390"` matches
    /// `"x390s"`.
    #[must_use]
    pub fn matches_strict<S: AsRef<str>>(&self, queries: &[S]) -> bool {
        let haystack = format!("{} {}", self.name, self.model).to_lowercase();
        queries.iter().any(|query| {
            let query = query.as_ref().to_lowercase();
            let mut words = query.split_whitespace().peekable();
            words.peek().is_some() && words.all(|word| haystack.contains(word))
        })
    }

    /// The ID with its characters reversed, so the condition grade leads.
    #[must_use]
    pub fn reverse_id(&self) -> String {
        self.id.chars().rev().collect()
    }

    /// Full URL of the retailer's page for this listing.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{PRODUCT_DETAIL_URL}{}", self.id)
    }

    /// Renders the stores as a comma-separated string.
    ///
    /// With `Some(max_chars)` and at least two stores, the output is cut
    /// to roughly `max_chars` characters and suffixed with `…`.
    #[must_use]
    pub fn stores_summary(&self, max_chars: Option<usize>) -> String {
        let summary = self
            .stores
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        let Some(max_chars) = max_chars else {
            return summary;
        };
        if self.stores.len() < 2 || summary.chars().count() <= max_chars {
            return summary;
        }

        let cut: String = summary.chars().take(max_chars).collect();
        let cut = cut.trim_end_matches(' ').trim_end_matches(',');
        format!("{cut}…")
    }
}

/// A store holding a listing, with its distance from the searcher's
/// postcode when that could be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDistance {
    pub store_id: Option<i64>,
    pub store_name: String,
    pub region_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// `None` when no postcode was given, the directory is not yet
    /// loaded, or the store is missing from the directory.
    pub distance_miles: Option<f64>,
}

impl StoreDistance {
    /// A store known only by name.
    #[must_use]
    pub fn name_only(name: impl Into<String>) -> Self {
        Self {
            store_id: None,
            store_name: name.into(),
            region_name: None,
            latitude: None,
            longitude: None,
            distance_miles: None,
        }
    }

    fn sort_distance(&self) -> f64 {
        self.distance_miles.unwrap_or(0.0)
    }
}

impl fmt::Display for StoreDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.distance_miles {
            None => write!(f, "{}", self.store_name),
            Some(miles) if miles <= 10.0 => write!(f, "{} ({miles:.1}mi)", self.store_name),
            Some(miles) => write!(f, "{} ({miles:.0}mi)", self.store_name),
        }
    }
}

/// Sorts stores near-to-far, breaking ties by case-sensitive name.
///
/// Stores without a distance sort as if they were at distance zero.
pub fn sort_store_distances(stores: &mut [StoreDistance]) {
    stores.sort_by(|a, b| {
        a.sort_distance()
            .total_cmp(&b.sort_distance())
            .then_with(|| a.store_name.cmp(&b.store_name))
    });
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
