//! Search entry point: dispatch, aggregation, then store-distance
//! enrichment.

use cexfind_core::{sort_store_distances, AppConfig, Listing, StoreDistance};
use cexfind_location::{
    haversine_distance, DirectorySettings, GeoLocation, PostcodeResolver, StoreDirectory,
};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::aggregate::aggregate;
use crate::client::SearchClient;
use crate::error::{QueryFailures, SearchError};

/// Outcome of a search that found at least one listing.
#[derive(Debug)]
pub struct SearchResults {
    /// Ordered listings, each with its stores sorted near-to-far.
    pub listings: Vec<Listing>,
    /// Query terms that failed while others succeeded.
    pub query_errors: Option<QueryFailures>,
}

/// How store lists are filled in for one search call.
enum Enrichment {
    /// No postcode given: names only.
    NoPostcode,
    /// Postcode given but the store directory has never loaded: names only.
    DirectoryUnavailable,
    /// Distances from this location.
    From(GeoLocation),
}

/// Product search with optional distance-to-store enrichment.
///
/// Owns its store directory and postcode cache, so separately built
/// instances share nothing.
pub struct CexFind {
    client: SearchClient,
    directory: StoreDirectory,
    resolver: PostcodeResolver,
    cancel: CancellationToken,
}

impl CexFind {
    #[must_use]
    pub fn new(client: SearchClient, directory: StoreDirectory, resolver: PostcodeResolver) -> Self {
        Self {
            client,
            directory,
            resolver,
            cancel: CancellationToken::new(),
        }
    }

    /// Builds every component from the application config and starts the
    /// store directory's background refresh. Does not wait for the first
    /// refresh; until it lands, [`distances_available`](Self::distances_available)
    /// is `false`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] or [`SearchError::Setup`] if a client
    /// cannot be built or an endpoint URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, SearchError> {
        let client = SearchClient::from_config(config)?;
        let resolver = PostcodeResolver::from_config(config).map_err(SearchError::Setup)?;
        let directory = StoreDirectory::spawn(&DirectorySettings::from_config(config))
            .map_err(SearchError::Setup)?;
        Ok(Self::new(client, directory, resolver))
    }

    /// Like [`from_config`](Self::from_config), but waits for the first
    /// store directory refresh before returning. A failed first refresh is
    /// logged and retried in the background, as with `from_config`.
    ///
    /// # Errors
    ///
    /// See [`CexFind::from_config`].
    pub async fn start(config: &AppConfig) -> Result<Self, SearchError> {
        let client = SearchClient::from_config(config)?;
        let resolver = PostcodeResolver::from_config(config).map_err(SearchError::Setup)?;
        let directory = StoreDirectory::start(DirectorySettings::from_config(config))
            .await
            .map_err(SearchError::Setup)?;
        Ok(Self::new(client, directory, resolver))
    }

    /// Searches for every query term concurrently and merges the results.
    ///
    /// With a non-empty `postcode` and an operational store directory each
    /// listing's stores carry distances from that postcode; otherwise they
    /// carry names only. Per-query failures are returned alongside the
    /// listings in [`SearchResults::query_errors`].
    ///
    /// # Errors
    ///
    /// - [`SearchError::NoResults`] if no query produced a listing.
    /// - [`SearchError::Postcode`] if the postcode cannot be resolved. No
    ///   listings are returned in that case.
    pub async fn search<S: AsRef<str>>(
        &self,
        queries: &[S],
        strict: bool,
        postcode: &str,
    ) -> Result<SearchResults, SearchError> {
        let outcomes = self.client.dispatch(queries, strict, &self.cancel.child_token());
        let mut found = aggregate(outcomes).await?;

        let enrichment = self.enrichment(postcode).await?;
        let enriched = join_all(
            found
                .listings
                .iter()
                .map(|listing| self.store_distances(&enrichment, &listing.store_names)),
        )
        .await;
        for (listing, stores) in found.listings.iter_mut().zip(enriched) {
            listing.stores = stores;
        }

        tracing::info!(
            queries = queries.len(),
            count = found.listings.len(),
            failed = found.failures.as_ref().map_or(0, QueryFailures::len),
            "search complete"
        );
        Ok(SearchResults {
            listings: found.listings,
            query_errors: found.failures,
        })
    }

    /// `true` once the store directory has loaded, i.e. when a postcode
    /// search will produce distances.
    #[must_use]
    pub fn distances_available(&self) -> bool {
        self.directory.is_operational()
    }

    /// Cancels in-flight queries and stops the store refresh task.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.directory.shutdown().await;
    }

    async fn enrichment(&self, postcode: &str) -> Result<Enrichment, SearchError> {
        if postcode.trim().is_empty() {
            return Ok(Enrichment::NoPostcode);
        }
        if !self.directory.is_operational() {
            tracing::debug!(postcode, "store directory not loaded; distances skipped");
            return Ok(Enrichment::DirectoryUnavailable);
        }
        let origin = self
            .resolver
            .resolve(postcode)
            .await
            .map_err(SearchError::Postcode)?;
        Ok(Enrichment::From(origin))
    }

    async fn store_distances(&self, enrichment: &Enrichment, names: &[String]) -> Vec<StoreDistance> {
        let mut stores = match enrichment {
            Enrichment::NoPostcode | Enrichment::DirectoryUnavailable => {
                names.iter().map(StoreDistance::name_only).collect()
            }
            Enrichment::From(origin) => {
                let mut stores = Vec::with_capacity(names.len());
                for name in names {
                    stores.push(self.locate(origin, name).await);
                }
                stores
            }
        };
        sort_store_distances(&mut stores);
        stores
    }

    /// Distance to the store called `name`, or the name alone if the
    /// directory does not know it.
    async fn locate(&self, origin: &GeoLocation, name: &str) -> StoreDistance {
        let Some(record) = self.directory.get(name).await else {
            tracing::debug!(store = name, "store not in directory");
            return StoreDistance::name_only(name);
        };
        let (miles, _km) = haversine_distance(origin.coordinate(), record.coordinate());
        StoreDistance {
            store_id: Some(record.store_id),
            store_name: name.to_owned(),
            region_name: Some(record.region_name),
            latitude: Some(record.latitude),
            longitude: Some(record.longitude),
            distance_miles: Some(miles),
        }
    }
}
