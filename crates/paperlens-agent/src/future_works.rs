//! Future-works agent: research ideas, review papers and improvement plans.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use paperlens_common::{Paper, PaperRef};
use paperlens_llm::LlmBackend;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::ask_llm;
use crate::database::DatabaseAgent;
use crate::error::{AgentError, Result};
use crate::prompts::{ideas_prompt, improvement_plan_prompt, plain_future_work_prompt, review_prompt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FutureWorkKind {
    #[default]
    Ideas,
    Review,
    ImprovementPlan,
}

impl FutureWorkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ideas => "ideas",
            Self::Review => "review",
            Self::ImprovementPlan => "improvement_plan",
        }
    }

    /// How many papers feed the prompt.
    fn paper_limit(self) -> usize {
        match self {
            Self::Ideas => 10,
            Self::Review => 15,
            Self::ImprovementPlan => 8,
        }
    }
}

impl FromStr for FutureWorkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ideas" => Ok(Self::Ideas),
            "review" => Ok(Self::Review),
            "improvement_plan" => Ok(Self::ImprovementPlan),
            other => Err(format!("unknown future-work kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FutureWork {
    pub topic: String,
    pub future_work: String,
    pub kind: FutureWorkKind,
    pub based_on_papers: Vec<PaperRef>,
    pub timestamp: DateTime<Utc>,
}

pub struct FutureWorksAgent {
    llm: Arc<dyn LlmBackend>,
    database: DatabaseAgent,
}

impl FutureWorksAgent {
    pub fn new(llm: Arc<dyn LlmBackend>, database: DatabaseAgent) -> Self {
        Self { llm, database }
    }

    /// Papers come from `paper_ids` when given, otherwise from the graph for
    /// `topic` over the last `years_back` years.
    #[instrument(skip(self))]
    pub async fn generate_future_work(
        &self,
        topic: &str,
        years_back: u32,
        paper_ids: &[String],
        kind: FutureWorkKind,
    ) -> Result<FutureWork> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AgentError::Validation("topic must not be empty".to_string()));
        }

        let papers = self.collect_papers(topic, years_back, paper_ids).await?;
        let selected = select_papers(papers, kind);

        let prompt = if selected.is_empty() {
            info!(topic, "no stored papers, using plain prompt");
            plain_future_work_prompt(topic, years_back)
        } else {
            info!(topic, kind = kind.as_str(), papers = selected.len(), "generating future work");
            match kind {
                FutureWorkKind::Ideas => ideas_prompt(topic, &selected),
                FutureWorkKind::Review => review_prompt(topic, &selected),
                FutureWorkKind::ImprovementPlan => improvement_plan_prompt(topic, &selected),
            }
        };

        let purpose = format!("future_works:{}", kind.as_str());
        let future_work = ask_llm(self.llm.as_ref(), &purpose, prompt).await?;

        Ok(FutureWork {
            topic: topic.to_string(),
            future_work,
            kind,
            based_on_papers: selected.iter().map(Paper::to_ref).collect(),
            timestamp: Utc::now(),
        })
    }

    async fn collect_papers(&self, topic: &str, years_back: u32, paper_ids: &[String]) -> Result<Vec<Paper>> {
        let ids: Vec<&str> = paper_ids.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
        if ids.is_empty() {
            return self.database.get_papers_last_n_years(topic, years_back).await;
        }

        let mut papers = Vec::with_capacity(ids.len());
        for id in ids {
            match self.database.get_paper_by_id(id).await? {
                Some(p) if !papers.iter().any(|q: &Paper| q.paper_id == p.paper_id) => papers.push(p),
                Some(_) => {}
                None => warn!(paper_id = id, "skipping unknown paper id"),
            }
        }
        Ok(papers)
    }
}

/// Order and cap the papers for a prompt: newest first for ideas and plans,
/// oldest first for a review. Undated papers count as year 0.
pub fn select_papers(mut papers: Vec<Paper>, kind: FutureWorkKind) -> Vec<Paper> {
    let year = |p: &Paper| p.effective_year().unwrap_or(0);
    match kind {
        FutureWorkKind::Review => papers.sort_by_key(|p| year(p)),
        _ => papers.sort_by_key(|p| std::cmp::Reverse(year(p))),
    }
    papers.truncate(kind.paper_limit());
    papers
}
