//! Literature source clients.

pub mod arxiv;

use async_trait::async_trait;
use paperlens_common::{Paper, Result};

/// Common interface for literature search backends.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Search for papers matching a topic, returns metadata only.
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>>;
}
