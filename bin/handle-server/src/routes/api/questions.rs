//! Suggested opening questions.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::schemas::api::questions::QuestionsResponse;
use crate::state::AppState;

const DEFAULT_QUESTIONS: &[&str] = &[
    "Hello",
    "How are you?",
    "AskHandle’s mission",
    "AskHandle introduction",
    "What is Generative AI?",
];

#[derive(OpenApi)]
#[openapi(paths(default_questions), components(schemas(QuestionsResponse)))]
pub struct QuestionsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/defaultQuestions", get(default_questions))
}

/// Static list of suggested questions (`GET /api/defaultQuestions`).
#[utoipa::path(
    get,
    path = "/api/defaultQuestions",
    tag = "widget",
    responses(
        (status = 200, description = "Suggested questions", body = QuestionsResponse)
    )
)]
pub async fn default_questions() -> Json<QuestionsResponse> {
    Json(QuestionsResponse {
        questions: DEFAULT_QUESTIONS.iter().map(|q| (*q).to_owned()).collect(),
    })
}
