//! Graph repository trait shared by the Neo4j and in-memory stores.

use std::cmp::Ordering;

use async_trait::async_trait;
use paperlens_common::Paper;

use crate::error::Result;

/// Storage for papers grouped under research topics.
#[async_trait]
pub trait PaperGraph: Send + Sync {
    /// Create the `unique_paper_id` / `unique_topic_name` constraints if missing.
    async fn ensure_constraints(&self) -> Result<()>;

    /// Upsert a paper and link it to `topic`. Returns whether the paper was written.
    async fn store_paper(&self, paper: &Paper, topic: &str) -> Result<bool>;

    /// Papers of a topic within inclusive year bounds, newest first
    /// (undated last), then by title.
    async fn get_papers_by_topic(
        &self,
        topic: &str,
        year_from: Option<i32>,
        year_to: Option<i32>,
    ) -> Result<Vec<Paper>>;

    async fn get_paper_by_id(&self, paper_id: &str) -> Result<Option<Paper>>;

    /// All topic names, sorted.
    async fn get_topics(&self) -> Result<Vec<String>>;

    /// Delete every paper linked to `topic`. Returns how many were removed.
    /// The topic node itself is kept.
    async fn clear_topic_data(&self, topic: &str) -> Result<u64>;
}

/// Order used by [`PaperGraph::get_papers_by_topic`].
pub fn sort_papers(papers: &mut [Paper]) {
    papers.sort_by(|a, b| {
        let by_year = match (a.effective_year(), b.effective_year()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_year.then_with(|| a.title.cmp(&b.title))
    });
}
