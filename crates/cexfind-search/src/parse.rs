//! Decoding of search endpoint response bodies.
//!
//! The endpoint sits behind a CDN that sometimes answers with an HTML error
//! or challenge page instead of JSON. When decoding fails the body is
//! scanned for something a person can act on before falling back to a
//! generic message.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::QueryError;
use crate::types::{SearchHit, SearchResponse};

/// Phrase present on the CDN's bot-protection interstitial.
pub(crate) const BLOCKED_MARKER: &str =
    "This website is using a security service to protect itself from online attacks";

pub(crate) const BLOCKED_REASON: &str = "CloudFlare has blocked this service.";

pub(crate) const GENERIC_REASON: &str = "search API unknown retrieval or unmarshalling error";

static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h1[^>]*>([^<]+)</h1>").expect("valid h1 regex"));

/// Decodes a search response body into its hits.
///
/// # Errors
///
/// - [`QueryError::Parse`] if `body` is not a search response.
/// - [`QueryError::NoResults`] if the response holds no hits.
pub fn parse_search_response(body: &str) -> Result<Vec<SearchHit>, QueryError> {
    let response = serde_json::from_str::<SearchResponse>(body).map_err(|source| {
        let reason = extract_error_reason(body).unwrap_or_else(|| GENERIC_REASON.to_string());
        QueryError::Parse { reason, source }
    })?;

    if response.hits().is_empty() {
        return Err(QueryError::NoResults);
    }
    Ok(response.into_hits())
}

/// Pulls a human-readable failure reason out of a non-JSON body: the text
/// of the first `<h1>`, or a fixed message for the CDN block page.
#[must_use]
pub fn extract_error_reason(body: &str) -> Option<String> {
    if let Some(caps) = H1_RE.captures(body) {
        let heading = caps[1].trim();
        if !heading.is_empty() {
            return Some(heading.to_string());
        }
    }
    body.contains(BLOCKED_MARKER)
        .then(|| BLOCKED_REASON.to_string())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
