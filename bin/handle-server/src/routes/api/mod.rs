//! Widget-facing routes nested under `/api`.

pub mod messages;
pub mod questions;
pub mod rooms;

use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;

use crate::state::AppState;

/// Routes nested under `/api`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(rooms::router())
        .merge(questions::router())
        .merge(messages::router())
}

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut doc = rooms::RoomsApi::openapi();
    doc.merge(questions::QuestionsApi::openapi());
    doc.merge(messages::MessagesApi::openapi());
    doc
}
