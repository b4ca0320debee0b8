use std::fmt;
use std::time::Duration;

use cexfind_location::LocationError;
use thiserror::Error;

/// Failure of a single query term. Never fatal to the search as a whole.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("http call error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON. `reason` is recovered
    /// from the body where possible (an HTML `<h1>` or a known blocking
    /// page), otherwise a generic message.
    #[error("{reason}")]
    Parse {
        reason: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no results found")]
    NoResults,

    #[error("search cancelled")]
    Cancelled,

    #[error("search did not complete within {deadline:?}")]
    DeadlineExceeded { deadline: Duration },
}

/// Every per-query failure of one search call, in arrival order.
///
/// Displays one `"query": error` line per failure, most recent first.
#[derive(Debug, Default)]
pub struct QueryFailures {
    failures: Vec<(String, QueryError)>,
}

impl QueryFailures {
    pub fn push(&mut self, query: impl Into<String>, error: QueryError) {
        self.failures.push((query.into(), error));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures in arrival order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &QueryError)> {
        self.failures.iter().map(|(q, e)| (q.as_str(), e))
    }

    /// The error recorded for `query`, if that term failed.
    #[must_use]
    pub fn get(&self, query: &str) -> Option<&QueryError> {
        self.failures
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, e)| e)
    }
}

impl fmt::Display for QueryFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (query, error)) in self.failures.iter().rev().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "\"{query}\": {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for QueryFailures {}

/// Failure of a whole search call.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Nothing survived aggregation. Carries the per-query failures, if
    /// any, that explain why.
    #[error("{}", no_results_message(.source.as_ref()))]
    NoResults {
        #[source]
        source: Option<QueryFailures>,
    },

    /// The searcher's postcode could not be resolved, so no listings are
    /// returned rather than some with and some without distances.
    #[error("postcode error: {0}")]
    Postcode(#[source] LocationError),

    #[error("location service setup failed: {0}")]
    Setup(#[source] LocationError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

fn no_results_message(failures: Option<&QueryFailures>) -> String {
    match failures {
        Some(failures) if !failures.is_empty() => failures.to_string(),
        _ => "no results".to_string(),
    }
}
