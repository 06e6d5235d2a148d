//! Database agent: the only path from the agents to the paper graph.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use paperlens_common::Paper;
use paperlens_kg::PaperGraph;
use tracing::{error, info, instrument, warn};

use crate::error::Result;

#[derive(Clone)]
pub struct DatabaseAgent {
    graph: Arc<dyn PaperGraph>,
}

impl DatabaseAgent {
    pub fn new(graph: Arc<dyn PaperGraph>) -> Self {
        Self { graph }
    }

    pub async fn ensure_constraints(&self) -> Result<()> {
        self.graph.ensure_constraints().await?;
        Ok(())
    }

    /// Store papers under `topic`. Failures are logged and not counted.
    #[instrument(skip(self, papers), fields(n = papers.len()))]
    pub async fn store_papers(&self, papers: &[Paper], topic: &str) -> usize {
        let mut count = 0;
        for paper in papers {
            match self.graph.store_paper(paper, topic).await {
                Ok(true) => count += 1,
                Ok(false) => warn!(paper_id = %paper.paper_id, "paper was not stored"),
                Err(e) => error!(paper_id = %paper.paper_id, error = %e, "error storing paper"),
            }
        }
        info!(topic, count, "stored papers");
        count
    }

    pub async fn get_papers_by_topic(
        &self,
        topic: &str,
        year_from: Option<i32>,
        year_to: Option<i32>,
    ) -> Result<Vec<Paper>> {
        let papers = self.graph.get_papers_by_topic(topic, year_from, year_to).await?;
        info!(topic, count = papers.len(), "retrieved papers");
        Ok(papers)
    }

    pub async fn get_paper_by_id(&self, paper_id: &str) -> Result<Option<Paper>> {
        let paper = self.graph.get_paper_by_id(paper_id).await?;
        if paper.is_none() {
            warn!(paper_id, "paper not found");
        }
        Ok(paper)
    }

    /// Papers of `topic` published from `current_year - years` to now.
    pub async fn get_papers_last_n_years(&self, topic: &str, years: u32) -> Result<Vec<Paper>> {
        let current_year = Utc::now().year();
        self.get_papers_by_topic(topic, Some(current_year - years as i32), Some(current_year))
            .await
    }

    pub async fn get_all_topics(&self) -> Result<Vec<String>> {
        Ok(self.graph.get_topics().await?)
    }

    /// Remove every paper stored under `topic`; returns how many were removed.
    pub async fn clear_topic_data(&self, topic: &str) -> Result<u64> {
        let removed = self.graph.clear_topic_data(topic).await?;
        info!(topic, removed, "cleared topic data");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens_test_utils::{paper, MemoryGraph};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_store_and_read_back() {
        let db = DatabaseAgent::new(Arc::new(MemoryGraph::new()));
        let stored = db
            .store_papers(&[paper("1", "A", 2022), paper("2", "B", 2024)], "nlp")
            .await;
        assert_eq!(stored, 2);

        let papers = db.get_papers_by_topic("nlp", None, None).await.unwrap();
        let ids: Vec<_> = papers.iter().map(|p| p.paper_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(db.get_all_topics().await.unwrap(), vec!["nlp".to_string()]);
        assert!(db.get_paper_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_n_years_window() {
        let year = Utc::now().year();
        let db = DatabaseAgent::new(Arc::new(
            MemoryGraph::with_papers(
                "cv",
                &[paper("recent", "R", year), paper("edge", "E", year - 3), paper("old", "O", year - 4)],
            )
            .await,
        ));
        let papers = db.get_papers_last_n_years("cv", 3).await.unwrap();
        let ids: Vec<_> = papers.iter().map(|p| p.paper_id.as_str()).collect();
        assert_eq!(ids, vec!["recent", "edge"]);
    }

    #[tokio::test]
    async fn test_clear_topic() {
        let db = DatabaseAgent::new(Arc::new(
            MemoryGraph::with_papers("rl", &[paper("1", "A", 2022)]).await,
        ));
        assert_eq!(db.clear_topic_data("rl").await.unwrap(), 1);
        assert!(db.get_papers_by_topic("rl", None, None).await.unwrap().is_empty());
    }
}
