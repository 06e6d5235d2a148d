//! Question answering over stored papers.

use axum::{extract::State, Json};
use paperlens_agent::QaAnswer;
use paperlens_common::ApiError;
use serde::Deserialize;

use super::ApiJson;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
    #[serde(default)]
    pub paper_ids: Vec<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

/// POST /qa - Answer a question about selected papers, or a topic's latest
pub async fn answer_question(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<QuestionRequest>,
) -> Result<Json<QaAnswer>, ApiError> {
    let answer = state
        .qa
        .answer_question(&req.question, &req.paper_ids, req.topic.as_deref())
        .await?;
    Ok(Json(answer))
}
