//! Shared application state for the web server.

use std::sync::Arc;
use std::time::Duration;

use paperlens_agent::{DatabaseAgent, FutureWorksAgent, QaAgent, SearchAgent};
use paperlens_config::Config;
use paperlens_ingestion::{LiteratureSource, PdfProcessor};
use paperlens_kg::PaperGraph;
use paperlens_llm::LlmBackend;

/// Agents injected into every Axum handler.
pub struct AppState {
    pub search: SearchAgent,
    pub database: DatabaseAgent,
    pub qa: QaAgent,
    pub future_works: FutureWorksAgent,
}

impl AppState {
    pub fn new(
        config: &Config,
        llm: Arc<dyn LlmBackend>,
        graph: Arc<dyn PaperGraph>,
        source: Arc<dyn LiteratureSource>,
        pdf: PdfProcessor,
    ) -> Self {
        let database = DatabaseAgent::new(graph);
        let pdf_delay = Duration::from_millis(config.arxiv.pdf_fetch_delay_ms);
        Self {
            search: SearchAgent::new(source, Arc::new(pdf), pdf_delay),
            qa: QaAgent::new(llm.clone(), database.clone(), config.qa.clone()),
            future_works: FutureWorksAgent::new(llm, database.clone()),
            database,
        }
    }
}

pub type SharedState = Arc<AppState>;
