//! paperlens-agent — The four agents behind the REST API.
//!
//!   SearchAgent       — arXiv search + PDF processing
//!   DatabaseAgent     — paper/topic storage in the graph
//!   QaAgent           — question answering over stored papers
//!   FutureWorksAgent  — research ideas, review papers, improvement plans

pub mod error;
pub mod prompts;
pub mod search;
pub mod database;
pub mod qa;
pub mod future_works;

pub use database::DatabaseAgent;
pub use error::AgentError;
pub use future_works::{FutureWork, FutureWorkKind, FutureWorksAgent};
pub use qa::{Citation, QaAgent, QaAnswer};
pub use search::SearchAgent;

use paperlens_llm::{audited_complete, strip_reasoning, LlmBackend, LlmError, LlmRequest};

/// Single-turn audited completion with reasoning blocks removed.
/// A reply that is nothing but reasoning counts as empty.
pub(crate) async fn ask_llm(llm: &dyn LlmBackend, purpose: &str, prompt: String) -> error::Result<String> {
    let (resp, _) = audited_complete(llm, purpose, LlmRequest::from_prompt(prompt)).await?;
    let answer = strip_reasoning(&resp.content);
    if answer.is_empty() {
        return Err(LlmError::EmptyResponse(resp.model).into());
    }
    Ok(answer)
}
