use paperlens_common::{ApiError, PaperlensError};
use paperlens_kg::KgError;
use paperlens_llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Source(#[from] PaperlensError),

    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Graph database error: {0}")]
    Graph(#[from] KgError),
}

pub type Result<T> = std::result::Result<T, AgentError>;

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Validation(msg) => ApiError::validation(msg),
            AgentError::NotFound(msg) => ApiError::not_found(msg),
            AgentError::Source(e) => ApiError::from(e),
            e @ (AgentError::Llm(_) | AgentError::Graph(_)) => ApiError::bad_gateway(e.to_string()),
        }
    }
}
