//! `GET /health`: liveness plus whether the proxy can reach the vendor at all.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthResponse)))]
pub struct HealthApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `"ok"`, or `"unconfigured"` when vendor routes would fail with 500.
    pub status: &'static str,
    pub version: &'static str,
    /// Whether a vendor credential is loaded.
    pub vendor_configured: bool,
}

/// Always 200; the vendor is not contacted.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let vendor_configured = state.vendor_configured();
    Json(HealthResponse {
        status: if vendor_configured { "ok" } else { "unconfigured" },
        version: env!("CARGO_PKG_VERSION"),
        vendor_configured,
    })
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::routes::api::test_support::{FakeVendor, app, call};

    #[tokio::test]
    async fn reports_configured_vendor() {
        let (status, body) = call(app(Some(Arc::new(FakeVendor::default()))), "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["vendor_configured"], true);
        assert!(!body["version"].as_str().unwrap_or("").is_empty());
    }

    #[tokio::test]
    async fn missing_credential_is_reported_not_failed() {
        let (status, body) = call(app(None), "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unconfigured");
        assert_eq!(body["vendor_configured"], false);
    }
}
