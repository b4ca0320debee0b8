pub mod app_config;
pub mod config;
pub mod listing;
pub mod query;
pub mod stores;

pub use app_config::{AppConfig, ConfigError};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::{sort_store_distances, Listing, StoreDistance, PRODUCT_DETAIL_URL};
pub use query::{check_queries, QueryInputError, MIN_QUERY_LEN, QUERY_SPLIT_CHAR};
pub use stores::{canonical_store_name, STORE_ALIASES};
