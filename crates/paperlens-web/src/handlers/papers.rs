//! Stored papers and topics.

use axum::{
    extract::{Path, State},
    Json,
};
use paperlens_common::{ApiError, Paper};
use serde::{Deserialize, Serialize};

use super::{check_range, ApiQuery};
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct YearFilter {
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct TopicPapers {
    pub topic: String,
    pub paper_count: usize,
    pub papers: Vec<Paper>,
}

#[derive(Debug, Serialize)]
pub struct TopicList {
    pub topics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearedTopic {
    pub topic: String,
    pub cleared: u64,
}

/// GET /papers/{topic} - Papers stored under a topic
pub async fn papers_by_topic(
    State(state): State<SharedState>,
    Path(topic): Path<String>,
    ApiQuery(filter): ApiQuery<YearFilter>,
) -> Result<Json<TopicPapers>, ApiError> {
    for (field, year) in [("year_from", filter.year_from), ("year_to", filter.year_to)] {
        if let Some(y) = year {
            check_range(field, y, 1900..=2100)?;
        }
    }

    let papers = state
        .database
        .get_papers_by_topic(&topic, filter.year_from, filter.year_to)
        .await?;
    Ok(Json(TopicPapers { topic, paper_count: papers.len(), papers }))
}

/// GET /paper/{paper_id} - One stored paper
pub async fn paper_by_id(
    State(state): State<SharedState>,
    Path(paper_id): Path<String>,
) -> Result<Json<Paper>, ApiError> {
    state
        .database
        .get_paper_by_id(&paper_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Paper not found: {}", paper_id)))
}

/// GET /topics - All topic names
pub async fn list_topics(State(state): State<SharedState>) -> Result<Json<TopicList>, ApiError> {
    let topics = state.database.get_all_topics().await?;
    Ok(Json(TopicList { topics }))
}

/// DELETE /topics/{topic} - Remove every paper of a topic
pub async fn clear_topic(
    State(state): State<SharedState>,
    Path(topic): Path<String>,
) -> Result<Json<ClearedTopic>, ApiError> {
    let cleared = state.database.clear_topic_data(&topic).await?;
    Ok(Json(ClearedTopic { topic, cleared }))
}
