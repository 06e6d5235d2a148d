use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::PaperlensError;

const USER_AGENT: &str = concat!("paperlens/", env!("CARGO_PKG_VERSION"));

/// An HTTP client that only talks to approved hosts.
/// arXiv searches and PDF downloads go through one of these; LLM backends
/// hold their own client.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Client with the default allowlist (arXiv + loopback) and a 30s timeout.
    pub fn new() -> Result<Self, PaperlensError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, PaperlensError> {
        let mut allowlist = HashSet::new();
        let domains = [
            "export.arxiv.org", // Atom search API
            "arxiv.org",        // abstract + PDF pages
            "localhost",        // Ollama local
            "127.0.0.1",
        ];
        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PaperlensError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Allows the host of a configured base URL (e.g. a remote LLM endpoint).
    pub fn allow_url_host(&mut self, url: &str) -> Result<(), PaperlensError> {
        let parsed = Url::parse(url)
            .map_err(|e| PaperlensError::Config(format!("Invalid URL {}: {}", url, e)))?;
        let host = parsed.host_str()
            .ok_or_else(|| PaperlensError::Config(format!("URL has no host: {}", url)))?;
        self.allow_domain(host);
        Ok(())
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn check(&self, url: &str) -> Result<(), PaperlensError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(PaperlensError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )))
        }
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, PaperlensError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }
}
