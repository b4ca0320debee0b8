//! Wire types for the search endpoint's JSON response.
//!
//! Only the fields used to build a [`cexfind_core::Listing`] are modelled;
//! everything else in a hit is ignored. Prices arrive as JSON numbers, so
//! `serde_json` hands them to [`Decimal`] as `f64`. `Decimal` parses the
//! shortest decimal form of that `f64`, which reproduces the two-place prices
//! the endpoint sends (`150.5` stays `150.5`).

use rust_decimal::Decimal;
use serde::Deserialize;

/// Top-level search response: one entry per request in the body.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// One item for sale as returned by the search endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub box_name: String,
    pub box_id: String,
    #[serde(default, rename = "categoryFriendlyName")]
    pub category: String,
    #[serde(rename = "sellPrice")]
    pub price: Decimal,
    #[serde(default, rename = "cashPriceCalculated")]
    pub cash_price: Decimal,
    #[serde(default, rename = "exchangePriceCalculated")]
    pub exchange_price: Decimal,
    #[serde(default)]
    pub stores: Vec<String>,
}

impl SearchResponse {
    /// Hits of the first (and only) result set, or an empty slice.
    #[must_use]
    pub fn hits(&self) -> &[SearchHit] {
        self.results.first().map_or(&[], |r| r.hits.as_slice())
    }

    #[must_use]
    pub fn into_hits(self) -> Vec<SearchHit> {
        self.results
            .into_iter()
            .next()
            .map(|r| r.hits)
            .unwrap_or_default()
    }
}
