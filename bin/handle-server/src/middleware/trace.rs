//! Request tracing.
//!
//! Every request runs inside an `http_request` span carrying an `x-trace-id`
//! (propagated when the caller sent a valid one). Small JSON bodies are
//! logged at debug level with the submitter's identity blanked out; anything
//! larger, or of another type, streams through without being buffered.

use std::time::Instant;

use axum::body::{Body, HttpBody};
use axum::extract::Request;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http_body_util::{BodyExt, Limited};
use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::ServerError;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Largest body buffered for the debug log.
const MAX_LOGGED_BODY: usize = 1024;

/// Keys whose values never reach the log.
const REDACTED_FIELDS: [&str; 3] = ["nickname", "email", "phone_number"];

pub async fn trace_requests(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let body = match log_body("request", &parts.headers, body).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "request body unreadable");
                return ServerError::BadRequest(format!("invalid request body: {e}")).into_response();
            }
        };
        let mut req = Request::from_parts(parts, body);
        if let Some(value) = header_value.clone() {
            req.headers_mut().insert(X_TRACE_ID, value);
        }

        let (parts, body) = next.run(req).await.into_parts();
        let body = log_body("response", &parts.headers, body).await.unwrap_or_else(|e| {
            warn!(error = %e, "response body unreadable");
            Body::empty()
        });
        let mut response = Response::from_parts(parts, body);
        if let Some(value) = header_value {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

/// Log `body` if it is JSON of a known, small size, handing back an
/// equivalent body. Other bodies are returned untouched.
async fn log_body(direction: &'static str, headers: &HeaderMap, body: Body) -> Result<Body, axum::Error> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    let size = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .or_else(|| body.size_hint().exact());

    if !is_json || !size.is_some_and(|size| size <= MAX_LOGGED_BODY as u64) {
        debug!(direction, size = ?size, "body not logged");
        return Ok(body);
    }

    let bytes = Limited::new(body, MAX_LOGGED_BODY)
        .collect()
        .await
        .map_err(axum::Error::new)?
        .to_bytes();
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut value) => {
            redact(&mut value);
            debug!(direction, body = %value, "body");
        }
        Err(_) => debug!(direction, size = bytes.len(), "body is not valid JSON"),
    }
    Ok(Body::from(bytes))
}

fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::from("[redacted]");
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

#[cfg(test)]
mod test {
    use axum::Router;
    use axum::body::{Body, Bytes};
    use axum::http::{Request, StatusCode};
    use axum::middleware;
    use axum::routing::post;
    use serde_json::json;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/api/sendMessage", post(|body: Bytes| async move { body.len().to_string() }))
            .layer(middleware::from_fn(trace_requests))
    }

    fn post_json(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/sendMessage")
            .header("content-type", "application/json")
            .header("content-length", body.len())
            .body(Body::from(body))
            .unwrap()
    }

    async fn text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    #[traced_test]
    async fn logged_submission_hides_identity() {
        let body = json!({
            "message": "Where is my order?",
            "room": "r1",
            "nickname": "Bob",
            "email": "b@x.com",
            "phone_number": "+15551234567"
        })
        .to_string();
        let len = body.len();

        let resp = app().oneshot(post_json(body)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(text(resp).await, len.to_string());
        assert!(logs_contain("Where is my order?"));
        assert!(logs_contain("[redacted]"));
        assert!(!logs_contain("b@x.com"));
        assert!(!logs_contain("+15551234567"));
        assert!(!logs_contain("Bob"));
    }

    #[tokio::test]
    #[traced_test]
    async fn large_body_streams_through_unlogged() {
        let body = json!({ "message": "x".repeat(8 * 1024), "email": "b@x.com" }).to_string();
        let len = body.len();

        let resp = app().oneshot(post_json(body)).await.unwrap();

        assert_eq!(text(resp).await, len.to_string());
        assert!(logs_contain("body not logged"));
        assert!(!logs_contain("xxxxxxxx"));
        assert!(!logs_contain("b@x.com"));
    }

    #[tokio::test]
    async fn body_longer_than_declared_is_rejected() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/sendMessage")
            .header("content-type", "application/json")
            .header("content-length", "10")
            .body(Body::from("x".repeat(4 * 1024)))
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valid_trace_id_is_propagated() {
        let id = Uuid::new_v4().to_string();
        let req = Request::builder()
            .method("POST")
            .uri("/api/sendMessage")
            .header(X_TRACE_ID, &id)
            .body(Body::empty())
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();

        assert_eq!(resp.headers()[X_TRACE_ID], id.as_str());
    }

    #[test]
    fn nested_identity_fields_are_redacted() {
        let mut value = json!({ "room": { "uuid": "r1" }, "items": [{ "email": "a@b.c" }] });
        redact(&mut value);
        assert_eq!(value, json!({ "room": { "uuid": "r1" }, "items": [{ "email": "[redacted]" }] }));
    }
}
