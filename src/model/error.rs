//! Typed errors for the REST API layer

use thiserror::Error;

/// Errors surfaced by [`ApiClient`](super::ApiClient) operations.
///
/// Most variants describe transport/server trouble; `DuplicateSong` and
/// `Credentials` are domain conditions callers may want to match on rather
/// than display verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("resource not found")]
    NotFound,

    #[error("invalid response body: {0}")]
    Parse(String),

    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Song is already in this playlist")]
    DuplicateSong,

    #[error("{0}")]
    Credentials(String),
}

impl ApiError {
    /// True for failures where retrying against the same server makes sense.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Request(e) => e.is_timeout() || e.is_connect(),
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
