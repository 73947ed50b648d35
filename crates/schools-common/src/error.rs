//! Error types for record decoding.

use thiserror::Error;

/// Result type alias using DecodeError.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// A payload that could not be turned into records at all.
///
/// Problems inside a single record never produce this error; they only
/// blank the affected fields.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON array of records, found {found}")]
    NotAnArray { found: &'static str },
}
