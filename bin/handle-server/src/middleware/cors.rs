use crate::state::AppState;
use tower_http::cors::{Any, CorsLayer};

/// CORS for the widget page.
///
/// `HANDLE_CORS_ORIGINS` restricts the allowed origins; without it (or when
/// none of the listed origins parse) any origin is accepted.
pub fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = state
        .config
        .cors_allowed_origins
        .as_deref()
        .map(|list| list.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    let cors = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        // Wildcard – suitable for development; set HANDLE_CORS_ORIGINS in production.
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
