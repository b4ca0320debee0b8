//! Conversion from raw [`SearchHit`]s to [`cexfind_core::Listing`]s.

use cexfind_core::{canonical_store_name, Listing};

use crate::model::extract_model;
use crate::types::SearchHit;

/// Builds a [`Listing`] from a search hit, deriving its model name and
/// rewriting long store names to their canonical aliases.
///
/// The listing's resolved `stores` are left empty for the orchestrator.
#[must_use]
pub fn normalize_hit(hit: SearchHit) -> Listing {
    Listing {
        model: extract_model(&hit.box_name),
        name: hit.box_name,
        category: hit.category,
        id: hit.box_id,
        price: hit.price,
        cash_price: hit.cash_price,
        exchange_price: hit.exchange_price,
        store_names: simplify_store_names(hit.stores),
        stores: Vec::new(),
    }
}

/// Replaces each store name containing a known long form with its alias.
#[must_use]
pub fn simplify_store_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|name| match canonical_store_name(&name) {
            Some(alias) => alias.to_string(),
            None => name,
        })
        .collect()
}
