use thiserror::Error;

/// Errors that can be returned by vendor-facing operations.
#[derive(Debug, Error)]
pub enum VendorError {
    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor answered with a non-2xx status.
    #[error("HTTP error {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Failed to serialize or deserialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The vendor response was missing an expected field or had an unexpected shape.
    #[error("Invalid vendor response: {message}")]
    InvalidResponse { message: String },

    /// An id that cannot be placed in a vendor URL; no request was made.
    #[error("not a valid vendor id: {0:?}")]
    InvalidId(String),

    /// The request body cannot be replayed, so it cannot be retried.
    #[error("request cannot be cloned for retry")]
    RequestNotCloneable,
}

impl VendorError {
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        VendorError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_owned(),
        }
    }
}
