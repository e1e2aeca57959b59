use handle_vendor::VendorError;
use thiserror::Error;

use crate::presenter::SlotId;

/// Result type for widget operations.
pub type WidgetResult<T> = Result<T, WidgetError>;

/// Errors raised on the client side of the chat.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The proxy server could not be reached or the response body was unreadable.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The proxy server answered with an error status.
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// A direct vendor read failed.
    #[error("vendor error: {0}")]
    Vendor(#[from] VendorError),

    /// No room / identity stored; the landing form has not been completed.
    #[error("no active chat session")]
    NoSession,

    /// The referenced transcript slot does not exist.
    #[error("unknown message slot {0}")]
    UnknownSlot(SlotId),

    /// The local key-value store could not be read or written.
    #[error("session store error: {0}")]
    Store(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The identity form has invalid fields.
    #[error("invalid form: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
