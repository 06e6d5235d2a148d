//! Configuration loading for Paperlens.
//!
//! Resolution order: built-in defaults, then `paperlens.toml` (or the path in
//! `PAPERLENS_CONFIG`) if present, then `.env`, then process environment.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("Invalid TOML in config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid { key: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub neo4j: Neo4jConfig,
    pub llm: LlmConfig,
    pub arxiv: ArxivConfig,
    pub qa: QaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String { "0.0.0.0:8000".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Neo4jConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            username: default_neo4j_user(),
            password: default_neo4j_password(),
        }
    }
}

fn default_neo4j_uri()      -> String { "bolt://localhost:7687".to_string() }
fn default_neo4j_user()     -> String { "neo4j".to_string() }
fn default_neo4j_password() -> String { "password".to_string() }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmBackendKind {
    Ollama,
    OpenAiCompatible,
}

impl FromStr for LlmBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai_compatible" | "openai-compatible" | "openai" => Ok(Self::OpenAiCompatible),
            other => Err(format!("unknown LLM backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: LlmBackendKind,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackendKind::Ollama,
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_model()    -> String { "deepseek-r1:1.5b".to_string() }
fn default_llm_base_url() -> String { "http://localhost:11434".to_string() }
fn default_llm_timeout()  -> u64    { 120 }

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArxivConfig {
    pub api_url: String,
    /// Pause between consecutive PDF downloads.
    pub pdf_fetch_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            api_url: default_arxiv_url(),
            pdf_fetch_delay_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

fn default_arxiv_url() -> String { "http://export.arxiv.org/api/query".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    /// Upper bound on paper text placed in a prompt, per paper.
    pub max_content_chars: usize,
    /// Papers pulled from a topic when a question names no paper ids.
    pub topic_fallback_papers: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self { max_content_chars: 8000, topic_fallback_papers: 5 }
    }
}

mod tests;

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }

        let path = std::env::var("PAPERLENS_CONFIG")
            .unwrap_or_else(|_| "paperlens.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Io { path: path.clone(), source })?;
            tracing::info!(%path, "reading config file");
            Self::from_toml_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from environment-style variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("PAPERLENS_BIND")  { self.server.bind = v; }
        if let Some(v) = get("NEO4J_URI")       { self.neo4j.uri = v; }
        if let Some(v) = get("NEO4J_USERNAME")  { self.neo4j.username = v; }
        if let Some(v) = get("NEO4J_PASSWORD")  { self.neo4j.password = v; }
        if let Some(v) = get("LLM_MODEL")       { self.llm.model = v; }
        if let Some(v) = get("LLM_BASE_URL")    { self.llm.base_url = v; }
        if let Some(v) = get("LLM_API_KEY")     { self.llm.api_key = Some(v); }
        if let Some(v) = get("ARXIV_API_URL")   { self.arxiv.api_url = v; }

        if let Some(v) = get("LLM_BACKEND") {
            self.llm.backend = v.parse().map_err(|reason| ConfigError::Invalid {
                key: "LLM_BACKEND",
                value: v.clone(),
                reason,
            })?;
        }
        if let Some(v) = get("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_number("LLM_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("PDF_FETCH_DELAY_MS") {
            self.arxiv.pdf_fetch_delay_ms = parse_number("PDF_FETCH_DELAY_MS", &v)?;
        }
        Ok(())
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
