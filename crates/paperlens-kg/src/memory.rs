//! In-memory [`PaperGraph`] used by tests and local demos without Neo4j.
//!
//! Mirrors the Neo4j upsert semantics: metadata is replaced on every store,
//! content only when the new value is non-empty.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use paperlens_common::Paper;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::repository::{sort_papers, PaperGraph};

#[derive(Default)]
struct State {
    papers: BTreeMap<String, Paper>,
    /// topic name -> paper ids
    topics: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Default)]
pub struct MemoryGraph {
    state: RwLock<State>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph pre-populated with `papers` under `topic`.
    pub async fn with_papers(topic: &str, papers: &[Paper]) -> Self {
        let graph = Self::new();
        for p in papers {
            // Infallible for the in-memory store.
            let _ = graph.store_paper(p, topic).await;
        }
        graph
    }

    pub async fn paper_count(&self) -> usize {
        self.state.read().await.papers.len()
    }
}

/// Persisted form: the derived section and figure lists are not stored.
fn stored_form(paper: &Paper, previous: Option<&Paper>) -> Paper {
    let mut stored = paper.clone();
    stored.sections.clear();
    stored.figures_tables.clear();
    stored.year = paper.effective_year();
    if !paper.has_content() {
        stored.content = previous.and_then(|p| p.content.clone());
    }
    stored
}

#[async_trait]
impl PaperGraph for MemoryGraph {
    async fn ensure_constraints(&self) -> Result<()> {
        Ok(())
    }

    async fn store_paper(&self, paper: &Paper, topic: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let stored = stored_form(paper, state.papers.get(&paper.paper_id));
        state.papers.insert(paper.paper_id.clone(), stored);
        state
            .topics
            .entry(topic.to_string())
            .or_default()
            .insert(paper.paper_id.clone());
        Ok(true)
    }

    async fn get_papers_by_topic(
        &self,
        topic: &str,
        year_from: Option<i32>,
        year_to: Option<i32>,
    ) -> Result<Vec<Paper>> {
        let state = self.state.read().await;
        let Some(ids) = state.topics.get(topic) else {
            return Ok(Vec::new());
        };
        let in_range = |p: &Paper| {
            let year = p.effective_year();
            year_from.map_or(true, |from| year.is_some_and(|y| y >= from))
                && year_to.map_or(true, |to| year.is_some_and(|y| y <= to))
        };
        let mut papers: Vec<Paper> = ids
            .iter()
            .filter_map(|id| state.papers.get(id))
            .filter(|p| in_range(p))
            .cloned()
            .collect();
        sort_papers(&mut papers);
        Ok(papers)
    }

    async fn get_paper_by_id(&self, paper_id: &str) -> Result<Option<Paper>> {
        Ok(self.state.read().await.papers.get(paper_id).cloned())
    }

    async fn get_topics(&self) -> Result<Vec<String>> {
        Ok(self.state.read().await.topics.keys().cloned().collect())
    }

    async fn clear_topic_data(&self, topic: &str) -> Result<u64> {
        let mut state = self.state.write().await;
        let ids: Vec<String> = match state.topics.get_mut(topic) {
            Some(ids) => std::mem::take(ids).into_iter().collect(),
            None => return Ok(0),
        };
        for id in &ids {
            state.papers.remove(id);
            for members in state.topics.values_mut() {
                members.remove(id);
            }
        }
        Ok(ids.len() as u64)
    }
}
