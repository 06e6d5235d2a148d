//! Future research suggestions.

use axum::{extract::State, Json};
use paperlens_agent::{FutureWork, FutureWorkKind};
use paperlens_common::ApiError;
use serde::Deserialize;

use super::{check_range, ApiJson};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
    #[serde(default = "default_years_back")]
    pub years_back: u32,
    #[serde(default)]
    pub paper_ids: Vec<String>,
    #[serde(default)]
    pub kind: FutureWorkKind,
}

fn default_years_back() -> u32 { 5 }

/// POST /generate-future-works
pub async fn generate_future_works(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<GenerateRequest>,
) -> Result<Json<FutureWork>, ApiError> {
    check_range("years_back", req.years_back, 1..=20)?;
    let work = state
        .future_works
        .generate_future_work(&req.topic, req.years_back, &req.paper_ids, req.kind)
        .await?;
    Ok(Json(work))
}
