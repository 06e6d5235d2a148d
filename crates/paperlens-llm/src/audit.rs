//! Audit trail for LLM calls.
//!
//! Every completion the agents request goes through [`audited_complete`], which
//! times the call and emits one structured `llm_audit` event. Output text is
//! never logged, only its SHA-256.

use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuditEntry {
    pub id: Uuid,
    /// What the call was for, e.g. "qa" or "future_works:review".
    pub purpose: String,
    pub model: String,
    pub backend: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub output_hash: String,
    pub latency_ms: u64,
    pub called_at: chrono::DateTime<Utc>,
}

impl LlmAuditEntry {
    pub fn new(purpose: &str, backend: &str, resp: &LlmResponse, latency_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            purpose: purpose.to_string(),
            model: resp.model.clone(),
            backend: backend.to_string(),
            prompt_tokens: resp.prompt_tokens,
            completion_tokens: resp.completion_tokens,
            output_hash: sha256_hex(&resp.content),
            latency_ms,
            called_at: Utc::now(),
        }
    }

    pub fn emit(&self) {
        tracing::info!(
            target: "llm_audit",
            id = %self.id,
            purpose = %self.purpose,
            model = %self.model,
            backend = %self.backend,
            prompt_tokens = self.prompt_tokens,
            completion_tokens = self.completion_tokens,
            output_hash = %self.output_hash,
            latency_ms = self.latency_ms,
            "llm call"
        );
    }
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Call `backend.complete` and record an audit entry for the result.
pub async fn audited_complete(
    backend: &dyn LlmBackend,
    purpose: &str,
    req: LlmRequest,
) -> Result<(LlmResponse, LlmAuditEntry), LlmError> {
    let start = Instant::now();
    let result = backend.complete(req).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(resp) => {
            let entry = LlmAuditEntry::new(purpose, backend.backend_name(), &resp, latency_ms);
            entry.emit();
            Ok((resp, entry))
        }
        Err(e) => {
            tracing::warn!(
                target: "llm_audit",
                purpose,
                model = backend.model_id(),
                latency_ms,
                error = %e,
                "llm call failed"
            );
            Err(e)
        }
    }
}
