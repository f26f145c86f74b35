use thiserror::Error;

/// Errors returned by BunnyCDN API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (DNS, connect, timeout) or the
    /// body could not be read.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} ({url})")]
    Status { status: u16, url: String },

    #[error("Failed to decode response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status code, if the API answered with a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias using [`ApiError`].
pub type Result<T> = std::result::Result<T, ApiError>;
