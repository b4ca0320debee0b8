//! Plain-text rendering of search results.

use std::fmt::Write as _;

use cexfind_core::Listing;

/// Characters of store information shown per listing.
const STORES_SUMMARY_LEN: usize = 80;

const INDENT: &str = "      ";

pub(crate) struct RenderOptions {
    pub verbose: bool,
    pub with_postcode: bool,
    pub distances_available: bool,
}

impl RenderOptions {
    fn show_details(&self) -> bool {
        self.verbose || self.with_postcode
    }
}

/// Renders listings grouped under a heading per model.
///
/// Listings are expected in search order, so equal models are adjacent.
pub(crate) fn render_listings(listings: &[Listing], options: &RenderOptions) -> String {
    let mut out = String::new();

    if options.show_details() {
        out.push_str("showing (cash/exchange price) and stores list");
        if options.with_postcode {
            if options.distances_available {
                out.push_str(", distance to stores in miles.");
            } else {
                out.push_str("\nnote: distance calculations failed.");
            }
        }
        out.push('\n');
    }

    let mut current_model: Option<&str> = None;
    for listing in listings {
        if current_model != Some(listing.model.as_str()) {
            let _ = write!(out, "\n{}\n", listing.model);
            current_model = Some(listing.model.as_str());
        }
        let price = listing.price.trunc().to_string();
        let _ = write!(
            out,
            "✱ {price:<3} {} [{}]\n{INDENT}{}\n",
            listing.name,
            listing.category,
            listing.url()
        );
        if options.show_details() {
            let _ = writeln!(
                out,
                "{INDENT}({}/{}) {}",
                listing.cash_price.trunc(),
                listing.exchange_price.trunc(),
                listing.stores_summary(Some(STORES_SUMMARY_LEN))
            );
        }
    }
    out
}
