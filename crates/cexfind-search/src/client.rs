use std::sync::Arc;
use std::time::Duration;

use cexfind_core::{AppConfig, Listing};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::QueryError;
use crate::normalize::normalize_hit;
use crate::parse::parse_search_response;

/// Request body for one search. `MODEL` is replaced by the URL-escaped
/// query term. The facet filter restricts hits to items in stock online.
pub const SEARCH_BODY_TEMPLATE: &str = concat!(
    r#"{"requests":[{"indexName":"prod_cex_uk","params":""#,
    "clickAnalytics=true",
    "&facetFilters=%5B%5B%22availability%3AIn%20Stock%20Online%22%5D%5D",
    "&facets=%5B%22*%22%5D",
    "&filters=boxVisibilityOnWeb%3D1%20",
    "&highlightPostTag=__%2Fais-highlight__",
    "&highlightPreTag=__ais-highlight__",
    "&hitsPerPage=50",
    "&maxValuesPerFacet=1000",
    "&page=0",
    "&query=MODEL",
    "&tagFilters=",
    "&userToken=71d182c769bd4dbc94081214a363c014",
    r#""}]}"#,
);

const QUERY_PLACEHOLDER: &str = "MODEL";

/// Capacity of the fan-in channel between query tasks and the aggregator.
const OUTCOME_BUFFER: usize = 64;

/// One message from a query task: a listing it found, or the reason the
/// query failed. A failed query sends exactly one outcome.
#[derive(Debug)]
pub struct QueryOutcome {
    pub query: String,
    pub result: Result<Listing, QueryError>,
}

/// HTTP client for the product search endpoint.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    url: String,
    deadline: Duration,
}

impl SearchClient {
    /// Creates a client posting to `url`.
    ///
    /// `timeout` bounds each HTTP request; `deadline` bounds a whole query
    /// task in [`dispatch`](Self::dispatch), response parsing included.
    ///
    /// # Errors
    ///
    /// Returns a [`reqwest::Error`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        url: &str,
        timeout: Duration,
        deadline: Duration,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
            deadline,
        })
    }

    /// Builds a client from the application config.
    ///
    /// # Errors
    ///
    /// See [`SearchClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.search_url,
            config.request_timeout(),
            config.search_deadline(),
            &config.user_agent,
        )
    }

    /// The request body for `query`.
    #[must_use]
    pub fn request_body(query: &str) -> String {
        let escaped = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
        SEARCH_BODY_TEMPLATE.replacen(QUERY_PLACEHOLDER, &escaped, 1)
    }

    /// Runs a single query and returns its listings in endpoint order.
    ///
    /// The status code is not checked before decoding: error pages are
    /// decoded (and fail) like any other body so their text can be
    /// reported.
    ///
    /// # Errors
    ///
    /// - [`QueryError::Http`] on network failure or request timeout.
    /// - [`QueryError::Parse`] if the body is not a search response.
    /// - [`QueryError::NoResults`] if the endpoint found nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<Listing>, QueryError> {
        tracing::debug!(query, "dispatching search query");
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .body(Self::request_body(query))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let hits = match parse_search_response(&body) {
            Ok(hits) => hits,
            Err(e) => {
                if !status.is_success() {
                    tracing::debug!(
                        query,
                        status = status.as_u16(),
                        "search endpoint returned an error page"
                    );
                }
                return Err(e);
            }
        };
        Ok(hits.into_iter().map(normalize_hit).collect())
    }

    /// Starts one task per query and returns the channel their outcomes
    /// arrive on. The channel closes once every task has finished.
    ///
    /// With `strict` set, listings that do not
    /// [match](Listing::matches_strict) any of `queries` are dropped. A
    /// failing query never affects the others. Cancelling `cancel` makes
    /// unfinished queries report [`QueryError::Cancelled`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch<S: AsRef<str>>(
        &self,
        queries: &[S],
        strict: bool,
        cancel: &CancellationToken,
    ) -> mpsc::Receiver<QueryOutcome> {
        let (tx, rx) = mpsc::channel(OUTCOME_BUFFER);
        let all_queries: Arc<[String]> = queries.iter().map(|q| q.as_ref().to_owned()).collect();

        for query in all_queries.iter() {
            tokio::spawn(run_query(
                self.clone(),
                query.clone(),
                Arc::clone(&all_queries),
                strict,
                cancel.clone(),
                tx.clone(),
            ));
        }
        rx
    }
}

async fn run_query(
    client: SearchClient,
    query: String,
    all_queries: Arc<[String]>,
    strict: bool,
    cancel: CancellationToken,
    tx: mpsc::Sender<QueryOutcome>,
) {
    let deadline = client.deadline;
    let result = tokio::select! {
        () = cancel.cancelled() => Err(QueryError::Cancelled),
        outcome = tokio::time::timeout(deadline, client.search(&query)) => {
            outcome.unwrap_or_else(|_| Err(QueryError::DeadlineExceeded { deadline }))
        }
    };

    match result {
        Ok(listings) => {
            let mut sent = 0_usize;
            for listing in listings {
                if strict && !listing.matches_strict(&all_queries[..]) {
                    continue;
                }
                let outcome = QueryOutcome {
                    query: query.clone(),
                    result: Ok(listing),
                };
                if tx.send(outcome).await.is_err() {
                    // receiver dropped; nobody is waiting for the rest
                    return;
                }
                sent += 1;
            }
            tracing::debug!(query = %query, count = sent, "search query complete");
        }
        Err(e) => {
            tracing::warn!(query = %query, error = %e, "search query failed");
            let _ = tx.send(QueryOutcome { query, result: Err(e) }).await;
        }
    }
}
