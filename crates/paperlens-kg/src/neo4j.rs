//! Neo4j-backed [`PaperGraph`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use neo4rs::{query, Graph};
use paperlens_common::Paper;
use tracing::{debug, info, instrument, warn};

use crate::error::{KgError, Result};
use crate::repository::PaperGraph;

const CONSTRAINTS: [&str; 2] = [
    "CREATE CONSTRAINT unique_paper_id IF NOT EXISTS FOR (p:Paper) REQUIRE p.paper_id IS UNIQUE",
    "CREATE CONSTRAINT unique_topic_name IF NOT EXISTS FOR (t:Topic) REQUIRE t.name IS UNIQUE",
];

/// Metadata is refreshed on every write; content only when a non-empty
/// value is supplied, so a metadata-only re-search keeps fetched text.
const UPSERT_PAPER: &str = r#"
    MERGE (p:Paper {paper_id: $paper_id})
    ON CREATE SET
        p.title = $title,
        p.authors = $authors,
        p.abstract = $abstract,
        p.published_date = $published_date,
        p.year = $year,
        p.url = $url,
        p.content = CASE WHEN $content = '' THEN null ELSE $content END,
        p.created_at = datetime()
    ON MATCH SET
        p.title = $title,
        p.authors = $authors,
        p.abstract = $abstract,
        p.published_date = $published_date,
        p.year = $year,
        p.url = $url,
        p.content = CASE WHEN $content = '' THEN p.content ELSE $content END,
        p.updated_at = datetime()
    WITH p
    MERGE (t:Topic {name: $topic})
    MERGE (p)-[:BELONGS_TO]->(t)
    RETURN p.paper_id AS paper_id
"#;

#[derive(Clone)]
pub struct Neo4jGraph {
    graph: Arc<Graph>,
}

impl Neo4jGraph {
    /// Connect to Neo4j. The driver pools connections internally.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password).await?;
        info!(%uri, "connected to Neo4j");
        Ok(Self { graph: Arc::new(graph) })
    }

    async fn fetch_papers(&self, q: neo4rs::Query) -> Result<Vec<Paper>> {
        let mut result = self.graph.execute(q).await?;
        let mut papers = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row
                .get("p")
                .map_err(|e| KgError::Decode(e.to_string()))?;
            papers.push(node_to_paper(&node)?);
        }
        Ok(papers)
    }
}

fn topic_name(row: &neo4rs::Row) -> Result<String> {
    row.get("name")
        .map_err(|e| KgError::Decode(format!("topic without name: {}", e)))
}

fn node_to_paper(node: &neo4rs::Node) -> Result<Paper> {
    let paper_id: String = node
        .get("paper_id")
        .map_err(|e| KgError::Decode(format!("paper without paper_id: {}", e)))?;
    let mut paper = Paper::new(paper_id, node.get::<String>("title").unwrap_or_default());
    paper.authors = node.get::<Vec<String>>("authors").unwrap_or_default();
    paper.abstract_text = node.get::<String>("abstract").unwrap_or_default();
    paper.published_date = node
        .get::<String>("published_date")
        .ok()
        .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());
    paper.year = node.get::<i64>("year").ok().map(|y| y as i32);
    paper.url = node.get::<String>("url").ok();
    paper.content = node.get::<String>("content").ok().filter(|c| !c.is_empty());
    Ok(paper)
}

#[async_trait]
impl PaperGraph for Neo4jGraph {
    async fn ensure_constraints(&self) -> Result<()> {
        for c in CONSTRAINTS {
            self.graph.run(query(c)).await?;
        }
        debug!("Neo4j constraints created or verified");
        Ok(())
    }

    #[instrument(skip(self, paper), fields(paper_id = %paper.paper_id))]
    async fn store_paper(&self, paper: &Paper, topic: &str) -> Result<bool> {
        let q = query(UPSERT_PAPER)
            .param("paper_id", paper.paper_id.as_str())
            .param("title", paper.title.as_str())
            .param("authors", paper.authors.clone())
            .param("abstract", paper.abstract_text.as_str())
            .param("published_date", paper.published_date.map(|d| d.format("%Y-%m-%d").to_string()))
            .param("year", paper.effective_year().map(i64::from))
            .param("url", paper.url.clone())
            .param("content", paper.content.clone().unwrap_or_default())
            .param("topic", topic);

        let mut result = self.graph.execute(q).await?;
        let stored = result.next().await?.is_some();
        while result.next().await?.is_some() {}
        if !stored {
            warn!(topic, "paper upsert returned no row");
        }
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn get_papers_by_topic(
        &self,
        topic: &str,
        year_from: Option<i32>,
        year_to: Option<i32>,
    ) -> Result<Vec<Paper>> {
        let q = query(
            "MATCH (p:Paper)-[:BELONGS_TO]->(t:Topic {name: $topic})
             WHERE ($year_from IS NULL OR p.year >= $year_from)
               AND ($year_to IS NULL OR p.year <= $year_to)
             RETURN p
             ORDER BY coalesce(p.year, -1) DESC, p.title",
        )
        .param("topic", topic)
        .param("year_from", year_from.map(i64::from))
        .param("year_to", year_to.map(i64::from));

        self.fetch_papers(q).await
    }

    async fn get_paper_by_id(&self, paper_id: &str) -> Result<Option<Paper>> {
        let q = query("MATCH (p:Paper {paper_id: $paper_id}) RETURN p LIMIT 1")
            .param("paper_id", paper_id);
        Ok(self.fetch_papers(q).await?.into_iter().next())
    }

    async fn get_topics(&self) -> Result<Vec<String>> {
        let mut result = self
            .graph
            .execute(query("MATCH (t:Topic) RETURN t.name AS name ORDER BY name"))
            .await?;
        let mut topics = Vec::new();
        while let Some(row) = result.next().await? {
            topics.push(topic_name(&row)?);
        }
        Ok(topics)
    }

    #[instrument(skip(self))]
    async fn clear_topic_data(&self, topic: &str) -> Result<u64> {
        let q = query(
            "MATCH (p:Paper)-[:BELONGS_TO]->(:Topic {name: $topic})
             DETACH DELETE p
             RETURN count(*) AS removed",
        )
        .param("topic", topic);

        let mut result = self.graph.execute(q).await?;
        let mut removed = 0;
        while let Some(row) = result.next().await? {
            removed = row.get::<i64>("removed").unwrap_or(0).max(0) as u64;
        }
        info!(topic, removed, "cleared topic papers");
        Ok(removed)
    }
}
