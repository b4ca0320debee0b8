//! Concurrent multi-query search over the retailer's product index.
//!
//! [`SearchClient`] fans each query term out to its own task,
//! [`aggregate`] merges, de-duplicates and orders what comes back, and
//! [`CexFind`] ties both to the store directory and postcode resolver to
//! add store distances.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod parse;
pub mod types;

pub use aggregate::{aggregate, sort_listings, Aggregate};
pub use client::{QueryOutcome, SearchClient, SEARCH_BODY_TEMPLATE};
pub use error::{QueryError, QueryFailures, SearchError};
pub use model::extract_model;
pub use orchestrator::{CexFind, SearchResults};
