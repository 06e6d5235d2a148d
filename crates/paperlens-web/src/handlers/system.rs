//! API banner and liveness.

use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// GET / - API banner
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Paperlens research paper assistant API is running" }))
}

/// GET /health - Liveness check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "timestamp": Utc::now().to_rfc3339() }))
}
