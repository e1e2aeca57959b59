use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body for `GET /api/defaultQuestions`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionsResponse {
    /// Suggested opening questions shown before the first message.
    pub questions: Vec<String>,
}
