//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! **Security note:** configuration faults are logged with full detail but
//! only a generic message is returned, so operators see which setting is
//! missing while end users never do.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use handle_vendor::VendorError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the handle-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or incomplete request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The server is missing required configuration (e.g. the vendor credential).
    #[error("server misconfiguration: {0}")]
    Misconfigured(String),

    /// The vendor call failed after its retry budget was spent.
    #[error("vendor error: {0}")]
    Vendor(#[from] VendorError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),

            ServerError::Misconfigured(m) => {
                error!(detail = %m, "server misconfiguration");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server misconfiguration".to_owned(),
                )
            }
            ServerError::Vendor(e) => {
                error!(error = %e, "vendor request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    }
}
