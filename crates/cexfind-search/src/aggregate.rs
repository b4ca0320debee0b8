//! Fan-in of query outcomes into one ordered, de-duplicated listing.

use std::collections::HashSet;

use cexfind_core::Listing;
use tokio::sync::mpsc;

use crate::client::QueryOutcome;
use crate::error::{QueryFailures, SearchError};

/// Listings gathered from all queries, plus any per-query failures.
///
/// A non-empty listing can arrive with failures; that is a partial
/// success and both halves matter to the caller.
#[derive(Debug)]
pub struct Aggregate {
    pub listings: Vec<Listing>,
    pub failures: Option<QueryFailures>,
}

/// Drains `outcomes` until every sender is gone, then orders the result.
///
/// The first listing seen for a given ID wins; later duplicates are
/// dropped. Duplicates come from the same index so are field-identical.
///
/// # Errors
///
/// Returns [`SearchError::NoResults`] if no listing arrived, carrying the
/// per-query failures when there were any.
pub async fn aggregate(mut outcomes: mpsc::Receiver<QueryOutcome>) -> Result<Aggregate, SearchError> {
    let mut listings = Vec::new();
    let mut seen = HashSet::new();
    let mut failures = QueryFailures::default();

    while let Some(outcome) = outcomes.recv().await {
        match outcome.result {
            Ok(listing) => {
                if seen.insert(listing.id.clone()) {
                    listings.push(listing);
                }
            }
            Err(e) => failures.push(outcome.query, e),
        }
    }

    let failures = (!failures.is_empty()).then_some(failures);
    if listings.is_empty() {
        return Err(SearchError::NoResults { source: failures });
    }

    sort_listings(&mut listings);
    tracing::debug!(count = listings.len(), "search results aggregated");
    Ok(Aggregate { listings, failures })
}

/// Orders listings by model, then price, then reversed ID.
///
/// The last character of an ID is the condition grade, so among listings
/// of the same model and price the better grade comes first.
pub fn sort_listings(listings: &mut [Listing]) {
    listings.sort_by_cached_key(|l| (l.model.clone(), l.price, l.reverse_id()));
}
