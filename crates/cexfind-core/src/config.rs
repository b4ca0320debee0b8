use crate::app_config::{AppConfig, ConfigError};

pub const DEFAULT_SEARCH_URL: &str = "https://search.webuy.io/1/indexes/*/queries";
pub const DEFAULT_STORES_URL: &str = "https://wss2.cex.uk.webuy.io/v3/stores";
pub const DEFAULT_POSTCODE_URL: &str = "https://api.postcodes.io/postcodes";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // All durations must be positive.
    let parse_secs = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        let secs = raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(secs)
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(raw)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("\"{raw}\" is not an http(s) URL"),
            })
        }
    };

    let search_url = parse_url("CEXFIND_SEARCH_URL", DEFAULT_SEARCH_URL)?;
    let stores_url = parse_url("CEXFIND_STORES_URL", DEFAULT_STORES_URL)?;
    let postcode_url = parse_url("CEXFIND_POSTCODE_URL", DEFAULT_POSTCODE_URL)?;

    let request_timeout_secs = parse_secs("CEXFIND_REQUEST_TIMEOUT_SECS", "2")?;
    let search_deadline_secs = parse_secs("CEXFIND_SEARCH_DEADLINE_SECS", "10")?;
    let store_refresh_secs = parse_secs("CEXFIND_STORE_REFRESH_SECS", "86400")?;
    let store_retry_secs = parse_secs("CEXFIND_STORE_RETRY_SECS", "300")?;

    let user_agent = or_default("CEXFIND_USER_AGENT", "cexfind/0.1");
    let log_level = or_default("CEXFIND_LOG_LEVEL", "info");

    Ok(AppConfig {
        search_url,
        stores_url,
        postcode_url,
        request_timeout_secs,
        search_deadline_secs,
        store_refresh_secs,
        store_retry_secs,
        user_agent,
        log_level,
    })
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            stores_url: DEFAULT_STORES_URL.to_string(),
            postcode_url: DEFAULT_POSTCODE_URL.to_string(),
            request_timeout_secs: 2,
            search_deadline_secs: 10,
            store_refresh_secs: 86_400,
            store_retry_secs: 300,
            user_agent: "cexfind/0.1".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
