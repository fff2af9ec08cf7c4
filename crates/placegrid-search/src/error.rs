use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by the places API ({reason})")]
    RateLimited { reason: String },

    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: &'static str },

    #[error("places API returned status {status} from {endpoint}: {message}")]
    ApiStatus {
        endpoint: &'static str,
        status: String,
        message: String,
    },

    #[error("invalid places API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
