//! Background-refreshed directory of physical stores.
//!
//! The directory starts empty and not operational. The first successful
//! refresh makes it operational, and it stays operational from then on:
//! later refresh failures are logged and the last good data keeps being
//! served. After a failed refresh the next attempt comes after the shorter
//! retry interval; after a success it reverts to the normal interval.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::LocationError;
use crate::types::{StoreRecord, StoresResponse};

/// Endpoint and timing settings for a [`StoreDirectory`].
#[derive(Debug, Clone)]
pub struct DirectorySettings {
    pub url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Period between refreshes while refreshes are succeeding.
    pub refresh_interval: Duration,
    /// Period before the next attempt after a failed refresh.
    pub retry_interval: Duration,
}

impl DirectorySettings {
    #[must_use]
    pub fn from_config(config: &cexfind_core::AppConfig) -> Self {
        Self {
            url: config.stores_url.clone(),
            timeout: config.request_timeout(),
            user_agent: config.user_agent.clone(),
            refresh_interval: config.store_refresh_interval(),
            retry_interval: config.store_retry_interval(),
        }
    }
}

struct Shared {
    client: Client,
    url: String,
    stores: RwLock<HashMap<String, StoreRecord>>,
    operational: AtomicBool,
}

/// Concurrent-safe map of store name to [`StoreRecord`].
///
/// Known alternate spellings (see [`cexfind_core::STORE_ALIASES`]) are
/// registered as extra keys pointing at the same record.
pub struct StoreDirectory {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StoreDirectory {
    /// Creates an empty directory with no background task.
    ///
    /// Call [`refresh`](Self::refresh) to load it, or use
    /// [`start`](Self::start) / [`spawn`](Self::spawn) to keep it fresh.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &DirectorySettings) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self {
            shared: Arc::new(Shared {
                client,
                url: settings.url.clone(),
                stores: RwLock::new(HashMap::new()),
                operational: AtomicBool::new(false),
            }),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        })
    }

    /// Creates a directory, waits for a first refresh, then keeps it fresh
    /// in a background task.
    ///
    /// A failed first refresh is logged, not returned: the directory comes
    /// back not operational and the background task retries after
    /// `retry_interval`.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Http`] if the HTTP client cannot be built.
    pub async fn start(settings: DirectorySettings) -> Result<Self, LocationError> {
        let directory = Self::new(&settings)?;
        let first_delay = match directory.refresh().await {
            Ok(_) => settings.refresh_interval,
            Err(e) => {
                tracing::warn!(error = %e, "initial store directory refresh failed");
                settings.retry_interval
            }
        };
        directory.spawn_refresh_loop(first_delay, &settings).await;
        Ok(directory)
    }

    /// Creates a directory whose background task refreshes immediately and
    /// then periodically. Returns without waiting for the first refresh.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Http`] if the HTTP client cannot be built.
    pub fn spawn(settings: &DirectorySettings) -> Result<Self, LocationError> {
        let mut directory = Self::new(settings)?;
        let handle = tokio::spawn(run_refresh_loop(
            Arc::clone(&directory.shared),
            directory.cancel.clone(),
            Duration::ZERO,
            settings.refresh_interval,
            settings.retry_interval,
        ));
        *directory.task.get_mut() = Some(handle);
        Ok(directory)
    }

    async fn spawn_refresh_loop(&self, first_delay: Duration, settings: &DirectorySettings) {
        let handle = tokio::spawn(run_refresh_loop(
            Arc::clone(&self.shared),
            self.cancel.clone(),
            first_delay,
            settings.refresh_interval,
            settings.retry_interval,
        ));
        *self.task.lock().await = Some(handle);
    }

    /// Fetches the full store list and merges it into the directory.
    ///
    /// Returns the number of stores received.
    ///
    /// # Errors
    ///
    /// - [`LocationError::Http`] on network failure.
    /// - [`LocationError::UnexpectedStatus`] on a non-2xx response.
    /// - [`LocationError::Deserialize`] if the body is not the expected JSON.
    /// - [`LocationError::EmptyStoreList`] if the endpoint listed no stores.
    pub async fn refresh(&self) -> Result<usize, LocationError> {
        self.shared.refresh().await
    }

    /// Looks up a store by exact name or registered alias.
    pub async fn get(&self, name: &str) -> Option<StoreRecord> {
        self.shared.stores.read().await.get(name).cloned()
    }

    /// `true` once at least one refresh has succeeded.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.shared.operational.load(Ordering::Acquire)
    }

    /// Number of names (aliases included) in the directory.
    pub async fn len(&self) -> usize {
        self.shared.stores.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stops the background refresh task and waits for it to exit.
    ///
    /// The directory keeps serving its current data afterwards.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self.task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "store refresh task ended abnormally");
            }
        }
    }
}

impl Drop for StoreDirectory {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Shared {
    async fn refresh(&self) -> Result<usize, LocationError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<StoresResponse>(&body).map_err(|e| {
            LocationError::Deserialize {
                context: format!("store list from {}", self.url),
                source: e,
            }
        })?;

        let received = parsed.response.data.stores.len();
        if received == 0 {
            return Err(LocationError::EmptyStoreList {
                url: self.url.clone(),
            });
        }

        let records: Vec<StoreRecord> = parsed
            .response
            .data
            .stores
            .into_iter()
            .filter_map(crate::types::RawStore::into_record)
            .collect();

        {
            let mut stores = self.stores.write().await;
            for record in records {
                stores.insert(record.store_name.clone(), record);
            }
            add_aliases(&mut stores);
        }
        self.operational.store(true, Ordering::Release);

        tracing::info!(count = received, "store directory refreshed");
        Ok(received)
    }
}

/// Registers each record whose name contains a known long form under its
/// canonical alias as well.
fn add_aliases(stores: &mut HashMap<String, StoreRecord>) {
    let aliased: Vec<(&'static str, StoreRecord)> = stores
        .iter()
        .filter_map(|(name, record)| {
            cexfind_core::canonical_store_name(name).map(|alias| (alias, record.clone()))
        })
        .collect();
    for (alias, record) in aliased {
        stores.insert(alias.to_string(), record);
    }
}

async fn run_refresh_loop(
    shared: Arc<Shared>,
    cancel: CancellationToken,
    first_delay: Duration,
    refresh_interval: Duration,
    retry_interval: Duration,
) {
    let mut delay = first_delay;
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("store refresh task cancelled");
                break;
            }
            () = tokio::time::sleep(delay) => {
                delay = match shared.refresh().await {
                    Ok(_) => refresh_interval,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            retry_in = ?retry_interval,
                            "store directory refresh failed; serving last known stores"
                        );
                        retry_interval
                    }
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, name: &str) -> StoreRecord {
        StoreRecord {
            store_id: id,
            store_name: name.to_string(),
            region_name: "London".to_string(),
            latitude: 51.5,
            longitude: -0.13,
        }
    }

    #[test]
    fn add_aliases_registers_canonical_names() {
        let mut stores = HashMap::new();
        stores.insert(
            "London - W1 Rathbone Place".to_string(),
            record(2, "London - W1 Rathbone Place"),
        );
        stores.insert("Walthamstow".to_string(), record(145, "Walthamstow"));

        add_aliases(&mut stores);

        assert_eq!(stores.len(), 3);
        let alias = stores.get("London W1 Rathbone").expect("alias registered");
        assert_eq!(alias.store_id, 2);
        assert_eq!(alias.store_name, "London - W1 Rathbone Place");
    }

    #[test]
    fn add_aliases_is_idempotent() {
        let mut stores = HashMap::new();
        stores.insert(
            "London W1 Tottenham Crt Rd".to_string(),
            record(7, "London W1 Tottenham Crt Rd"),
        );
        add_aliases(&mut stores);
        add_aliases(&mut stores);
        assert_eq!(stores.len(), 2);
    }

    #[tokio::test]
    async fn new_directory_is_not_operational() {
        let settings = DirectorySettings {
            url: "http://127.0.0.1:9/stores".to_string(),
            timeout: Duration::from_secs(1),
            user_agent: "test".to_string(),
            refresh_interval: Duration::from_secs(60),
            retry_interval: Duration::from_secs(1),
        };
        let directory = StoreDirectory::new(&settings).unwrap();
        assert!(!directory.is_operational());
        assert!(directory.is_empty().await);
        assert!(directory.get("Walthamstow").await.is_none());
    }
}
