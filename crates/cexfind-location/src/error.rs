use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("no postcode provided")]
    EmptyPostcode,

    #[error("location not found for postcode \"{postcode}\"")]
    NotFound { postcode: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store list from {url} was empty")]
    EmptyStoreList { url: String },

    #[error("invalid endpoint URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
