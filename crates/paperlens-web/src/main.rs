//! Paperlens web server.
//!
//! Run with: cargo run -p paperlens-web

use std::sync::Arc;
use std::time::Duration;

use paperlens_common::sandbox::SandboxClient;
use paperlens_config::{Config, LlmBackendKind};
use paperlens_ingestion::{ArxivClient, PdfProcessor};
use paperlens_kg::Neo4jGraph;
use paperlens_llm::{build_backend, BackendConfig, BackendKind};
use paperlens_web::{router::build_router, state::AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn backend_config(config: &Config) -> BackendConfig {
    BackendConfig {
        kind: match config.llm.backend {
            LlmBackendKind::Ollama => BackendKind::Ollama,
            LlmBackendKind::OpenAiCompatible => BackendKind::OpenAiCompatible,
        },
        model: config.llm.model.clone(),
        base_url: config.llm.base_url.clone(),
        api_key: config.llm.api_key.clone(),
        timeout_secs: config.llm.timeout_secs,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("paperlens=debug,info")),
        )
        .init();

    info!("Paperlens starting up, version {}", env!("CARGO_PKG_VERSION"));
    let config = Config::load()?;

    let llm = build_backend(&backend_config(&config))?;

    let graph = Neo4jGraph::connect(&config.neo4j.uri, &config.neo4j.username, &config.neo4j.password).await?;

    let timeout = Duration::from_secs(config.arxiv.request_timeout_secs);
    let arxiv = ArxivClient::new(config.arxiv.api_url.clone(), timeout)?;
    let pdf = PdfProcessor::new(SandboxClient::with_timeout(timeout)?);

    let state = AppState::new(&config, llm, Arc::new(graph), Arc::new(arxiv), pdf);
    state.database.ensure_constraints().await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);
    info!("Browser UI at http://{}/ui", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
