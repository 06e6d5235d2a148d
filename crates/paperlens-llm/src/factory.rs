//! Builds the configured backend behind an `Arc<dyn LlmBackend>`.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{LlmBackend, LlmError, OllamaBackend, OpenAiCompatibleBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ollama,
    OpenAiCompatible,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Ollama,
            model: "deepseek-r1:1.5b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

pub fn build_backend(cfg: &BackendConfig) -> Result<Arc<dyn LlmBackend>, LlmError> {
    let timeout = Duration::from_secs(cfg.timeout_secs.max(1));
    let backend: Arc<dyn LlmBackend> = match cfg.kind {
        BackendKind::Ollama => Arc::new(OllamaBackend::new(&cfg.base_url, &cfg.model, timeout)?),
        BackendKind::OpenAiCompatible => Arc::new(OpenAiCompatibleBackend::new(
            &cfg.base_url,
            &cfg.model,
            cfg.api_key.clone(),
            timeout,
        )?),
    };
    tracing::info!(
        backend = backend.backend_name(),
        model = backend.model_id(),
        base_url = %cfg.base_url,
        "LLM backend ready"
    );
    Ok(backend)
}
