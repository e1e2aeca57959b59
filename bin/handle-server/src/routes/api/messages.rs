//! Message submission and answer lookup.
//!
//! `POST /api/sendMessage` forwards a user message to the vendor and holds the
//! request open while the answer is polled, so the widget gets either the
//! answer or the fallback text in one round trip. `GET /api/messages/{uuid}`
//! is a single read the widget uses for its own fallback polling without ever
//! seeing the vendor credential.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use handle_vendor::{is_plain_id, resolve_answer};
use tracing::{debug, info};
use utoipa::OpenApi;
use validator::Validate;

use crate::error::ServerError;
use crate::schemas::api::messages::{AnswerResponse, MISSING_FIELDS, SendMessageRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(send_message, get_message),
    components(schemas(SendMessageRequest, AnswerResponse))
)]
pub struct MessagesApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sendMessage", post(send_message))
        .route("/messages/{uuid}", get(get_message))
}

/// Submit a message and wait for its answer (`POST /api/sendMessage`).
///
/// A poll budget running out is not an error: the response is 200 with the
/// fallback answer.
#[utoipa::path(
    post,
    path = "/api/sendMessage",
    tag = "widget",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Answer or fallback text", body = AnswerResponse),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "Missing credential or vendor failure"),
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ServerError> {
    let Json(req) = payload?;
    if let Err(errors) = req.validate() {
        debug!(fields = ?errors.field_errors().keys().collect::<Vec<_>>(), "rejected submission");
        return Err(ServerError::BadRequest(MISSING_FIELDS.into()));
    }

    let vendor = state.vendor()?;
    let message = req.into_outgoing();
    let resolution = resolve_answer(vendor, &state.config.resolution, &message).await?;

    info!(
        room = %message.room.uuid,
        message = %resolution.message_uuid,
        polls = resolution.polls,
        failed_polls = resolution.failed_polls,
        timed_out = resolution.timed_out,
        "message resolved"
    );
    Ok(Json(resolution.into()))
}

/// Read the current answer of a message once (`GET /api/messages/{uuid}`).
///
/// `support_answer` is empty while the vendor is still working.
#[utoipa::path(
    get,
    path = "/api/messages/{uuid}",
    tag = "widget",
    params(("uuid" = String, Path, description = "Vendor message id")),
    responses(
        (status = 200, description = "Current answer, possibly empty", body = AnswerResponse),
        (status = 400, description = "Not a message id"),
        (status = 500, description = "Missing credential or vendor failure"),
    )
)]
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
) -> Result<Json<AnswerResponse>, ServerError> {
    if !is_plain_id(&uuid) {
        debug!(uuid = %uuid.escape_debug(), "rejected message id");
        return Err(ServerError::BadRequest("invalid message id".into()));
    }
    let record = state
        .vendor()?
        .get_message(&uuid, state.config.resolution.poll_retry)
        .await?;
    Ok(Json(record.into()))
}
