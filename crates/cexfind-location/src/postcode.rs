//! Postcode geocoding with a per-resolver cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use tokio::sync::{OnceCell, RwLock};

use crate::error::LocationError;
use crate::types::{GeoLocation, PostcodeResponse};

/// Normalises a postcode for use as a cache key: trimmed, lower-cased, and
/// with runs of internal whitespace collapsed to a single space.
#[must_use]
pub fn normalize_postcode(postcode: &str) -> String {
    postcode
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolves UK postcodes to coordinates via a postcodes.io-style endpoint.
///
/// Each normalised postcode is fetched upstream at most once for the
/// lifetime of the resolver. Every key owns a [`OnceCell`]: concurrent
/// lookups of the same new postcode wait on that cell, while lookups of other
/// postcodes never wait on it. A failed fetch leaves the cell empty, so the
/// next lookup retries.
pub struct PostcodeResolver {
    client: Client,
    url: Url,
    cache: RwLock<HashMap<String, Arc<OnceCell<GeoLocation>>>>,
}

impl PostcodeResolver {
    /// Creates a resolver for the endpoint at `url` (queried as `url?q=`).
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidUrl`] if `url` does not parse, or
    /// [`LocationError::Http`] if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration, user_agent: &str) -> Result<Self, LocationError> {
        let url = Url::parse(url).map_err(|e| LocationError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Builds a resolver from the application config.
    ///
    /// # Errors
    ///
    /// See [`PostcodeResolver::new`].
    pub fn from_config(config: &cexfind_core::AppConfig) -> Result<Self, LocationError> {
        Self::new(
            &config.postcode_url,
            config.request_timeout(),
            &config.user_agent,
        )
    }

    /// Returns the location of `postcode`, from cache when possible.
    ///
    /// # Errors
    ///
    /// - [`LocationError::EmptyPostcode`] if `postcode` is blank.
    /// - [`LocationError::NotFound`] if the endpoint has no match.
    /// - [`LocationError::Http`], [`LocationError::UnexpectedStatus`] or
    ///   [`LocationError::Deserialize`] if the lookup itself fails.
    pub async fn resolve(&self, postcode: &str) -> Result<GeoLocation, LocationError> {
        let key = normalize_postcode(postcode);
        if key.is_empty() {
            return Err(LocationError::EmptyPostcode);
        }

        let cell = self.cell_for(&key).await;
        if let Some(location) = cell.get() {
            tracing::debug!(postcode = %key, "postcode cache hit");
            return Ok(location.clone());
        }

        let resolved = cell
            .get_or_try_init(|| async {
                let location = self.fetch(&key).await?;
                tracing::debug!(
                    postcode = %key,
                    district = %location.district,
                    "postcode resolved"
                );
                Ok::<_, LocationError>(location)
            })
            .await
            .cloned();

        if resolved.is_err() {
            self.forget_failed(&key, &cell).await;
        }
        resolved
    }

    /// Number of postcodes currently cached.
    pub async fn cached_len(&self) -> usize {
        self.cache
            .read()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    /// Returns the cell for `key`, creating it if needed. The map lock is
    /// released before the caller awaits the cell.
    async fn cell_for(&self, key: &str) -> Arc<OnceCell<GeoLocation>> {
        if let Some(cell) = self.cache.read().await.get(key) {
            return Arc::clone(cell);
        }
        let mut cache = self.cache.write().await;
        Arc::clone(cache.entry(key.to_owned()).or_default())
    }

    /// Drops the entry for `key` if it is still the empty `cell` that just
    /// failed.
    async fn forget_failed(&self, key: &str, cell: &Arc<OnceCell<GeoLocation>>) {
        let mut cache = self.cache.write().await;
        if cache
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && !current.initialized())
        {
            cache.remove(key);
        }
    }

    async fn fetch(&self, postcode: &str) -> Result<GeoLocation, LocationError> {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("q", postcode);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<PostcodeResponse>(&body).map_err(|e| {
            LocationError::Deserialize {
                context: format!("postcode lookup for \"{postcode}\""),
                source: e,
            }
        })?;

        parsed
            .result
            .and_then(|results| results.into_iter().next())
            .map(GeoLocation::from)
            .ok_or_else(|| LocationError::NotFound {
                postcode: postcode.to_owned(),
            })
    }
}
