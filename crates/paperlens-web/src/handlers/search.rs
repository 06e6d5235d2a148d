//! arXiv search endpoint.

use axum::{extract::State, Json};
use paperlens_common::{ApiError, Paper};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{check_range, ApiJson};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub topic: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_years_back")]
    pub years_back: u32,
    #[serde(default = "default_fetch_content")]
    pub fetch_content: bool,
}

fn default_max_results() -> usize { 10 }
fn default_years_back() -> u32 { 5 }
fn default_fetch_content() -> bool { true }

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub message: String,
    pub papers: Vec<Paper>,
}

/// POST /search - Query arXiv and store the results under the topic.
///
/// With `fetch_content`, PDF processing and storage run in a spawned task
/// and the response returns the metadata immediately.
pub async fn search_papers(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    check_range("max_results", req.max_results, 1..=50)?;
    check_range("years_back", req.years_back, 1..=20)?;
    let topic = req.topic.trim().to_string();

    let papers = state.search.search_arxiv(&topic, req.max_results, req.years_back).await?;

    if req.fetch_content && !papers.is_empty() {
        let message = format!("Processing {} papers in background.", papers.len());
        let task_state = state.clone();
        let task_papers = papers.clone();
        tokio::spawn(async move {
            let processed = task_state.search.process_papers(task_papers, true).await;
            let stored = task_state.database.store_papers(&processed, &topic).await;
            info!(%topic, stored, "background processing finished");
        });
        return Ok(Json(SearchResponse { message, papers }));
    }

    let stored = state.database.store_papers(&papers, &topic).await;
    Ok(Json(SearchResponse {
        message: format!("Stored {} papers.", stored),
        papers,
    }))
}
