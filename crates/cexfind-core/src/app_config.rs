use std::time::Duration;

use thiserror::Error;

/// Errors produced while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Runtime configuration shared by the search, location and CLI crates.
///
/// Every field has a default, so an empty environment yields a usable
/// config pointed at the live endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Product search endpoint (POST, JSON body).
    pub search_url: String,
    /// Store directory endpoint (GET).
    pub stores_url: String,
    /// Postcode geocoding endpoint (GET with `?q=`).
    pub postcode_url: String,
    pub request_timeout_secs: u64,
    /// Upper bound on how long a single query term may take, body read
    /// included.
    pub search_deadline_secs: u64,
    pub store_refresh_secs: u64,
    /// Shortened refresh period used after a failed store refresh.
    pub store_retry_secs: u64,
    pub user_agent: String,
    pub log_level: String,
}

impl AppConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn search_deadline(&self) -> Duration {
        Duration::from_secs(self.search_deadline_secs)
    }

    #[must_use]
    pub fn store_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.store_refresh_secs)
    }

    #[must_use]
    pub fn store_retry_interval(&self) -> Duration {
        Duration::from_secs(self.store_retry_secs)
    }
}
