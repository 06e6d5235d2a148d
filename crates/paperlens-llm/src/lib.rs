//! paperlens-llm — LLM backend abstraction layer.
//! The agents only ever see `Arc<dyn LlmBackend>`; concrete backends speak the
//! OpenAI-style chat-completions wire format.

pub mod backend;
pub mod factory;
pub mod audit;
pub mod clean;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
pub use factory::{build_backend, BackendConfig, BackendKind};
pub use clean::strip_reasoning;
pub use audit::{audited_complete, LlmAuditEntry};
