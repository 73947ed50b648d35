//! Fetch failures.

use thiserror::Error;

/// Why a GET against an open-data endpoint produced no usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Access denied (HTTP 403) for {url}")]
    AccessDenied { url: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Empty response body from {url}")]
    NoData { url: String },

    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::AccessDenied { url }
            | FetchError::UnexpectedStatus { url, .. }
            | FetchError::NoData { url }
            | FetchError::Transport { url, .. } => url,
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, FetchError::AccessDenied { .. })
    }

    /// Short label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "invalid_url",
            FetchError::AccessDenied { .. } => "access_denied",
            FetchError::UnexpectedStatus { .. } => "unexpected_status",
            FetchError::NoData { .. } => "no_data",
            FetchError::Transport { .. } => "transport",
        }
    }
}
