//! Q&A agent: answers questions grounded in stored papers.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use paperlens_common::{Paper, PaperRef};
use paperlens_config::QaConfig;
use paperlens_ingestion::chunker::{chunk_paper, fit_chunks, ChunkerConfig};
use paperlens_llm::LlmBackend;
use regex::Regex;
use serde::Serialize;
use tracing::{info, instrument};

use crate::database::DatabaseAgent;
use crate::error::{AgentError, Result};
use crate::prompts::{qa_prompt, single_paper_prompt, PaperContext};
use crate::ask_llm;

pub const NO_PAPERS_ANSWER: &str = "No papers provided for reference.";

/// A `[Paper N - Title, Section S]` reference found in an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub paper_num: String,
    pub paper_title: String,
    pub section: String,
    pub full_citation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QaAnswer {
    pub question: String,
    pub answer: String,
    pub papers: Vec<PaperRef>,
    pub citations: Vec<Citation>,
    pub timestamp: DateTime<Utc>,
}

impl QaAnswer {
    fn new(question: &str, answer: String, papers: Vec<PaperRef>) -> Self {
        Self {
            question: question.to_string(),
            citations: extract_citations(&answer),
            answer,
            papers,
            timestamp: Utc::now(),
        }
    }
}

pub struct QaAgent {
    llm: Arc<dyn LlmBackend>,
    database: DatabaseAgent,
    config: QaConfig,
}

impl QaAgent {
    pub fn new(llm: Arc<dyn LlmBackend>, database: DatabaseAgent, config: QaConfig) -> Self {
        Self { llm, database, config }
    }

    /// Answer `question` from the papers named by `paper_ids`, or from the
    /// most recent papers of `topic` when no ids are given.
    #[instrument(skip(self))]
    pub async fn answer_question(
        &self,
        question: &str,
        paper_ids: &[String],
        topic: Option<&str>,
    ) -> Result<QaAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AgentError::Validation("question must not be empty".to_string()));
        }

        let mut found: Vec<Paper> = Vec::new();
        let mut missing: Vec<&str> = Vec::new();
        let mut seen = HashSet::new();
        for id in paper_ids.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !seen.insert(id) {
                continue;
            }
            match self.database.get_paper_by_id(id).await? {
                Some(p) => found.push(p),
                None => missing.push(id),
            }
        }

        if seen.is_empty() {
            if let Some(topic) = topic.map(str::trim).filter(|t| !t.is_empty()) {
                found = self.database.get_papers_by_topic(topic, None, None).await?;
                found.truncate(self.config.topic_fallback_papers);
            }
        }

        if found.is_empty() && missing.is_empty() {
            info!("no papers to answer from");
            return Ok(QaAnswer::new(question, NO_PAPERS_ANSWER.to_string(), Vec::new()));
        }

        let budget = self.per_paper_budget(found.len() + missing.len());
        let chunker = ChunkerConfig::default();
        let excerpts: Vec<String> = found
            .iter()
            .map(|p| fit_chunks(&chunk_paper(p, &chunker), budget))
            .collect();

        let mut contexts: Vec<PaperContext<'_>> = found
            .iter()
            .zip(excerpts)
            .map(|(paper, excerpt)| PaperContext::Found { paper, excerpt })
            .collect();
        contexts.extend(missing.iter().map(|id| PaperContext::Missing(*id)));

        info!(papers = found.len(), missing = missing.len(), budget, "answering question");
        let answer = ask_llm(self.llm.as_ref(), "qa", qa_prompt(question, &contexts)).await?;
        let refs = found.iter().map(Paper::to_ref).collect();
        Ok(QaAnswer::new(question, answer, refs))
    }

    /// Answer a question about one paper using its own text only.
    pub async fn answer_question_single_paper(&self, question: &str, paper: &Paper) -> Result<QaAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AgentError::Validation("question must not be empty".to_string()));
        }
        info!(paper_id = %paper.paper_id, "answering question about single paper");
        let prompt = single_paper_prompt(question, paper, self.config.max_content_chars);
        let answer = ask_llm(self.llm.as_ref(), "qa_single_paper", prompt).await?;
        Ok(QaAnswer::new(question, answer, vec![paper.to_ref()]))
    }

    /// Characters of paper text per paper: half the backend context window
    /// (at ~3 chars/token) split across papers, capped by config.
    fn per_paper_budget(&self, n_papers: usize) -> usize {
        let window_chars = self.llm.max_context_tokens().saturating_mul(3) / 2;
        (window_chars / n_papers.max(1)).min(self.config.max_content_chars)
    }
}

fn citation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[Paper\s+(\d+)(?:\s*-\s*([^,]+))?,\s*(?:Section\s+([^\]]+))?\]").unwrap()
    })
}

/// Extract `[Paper N - Title, Section S]` citations in order of appearance.
pub fn extract_citations(answer: &str) -> Vec<Citation> {
    citation_pattern()
        .captures_iter(answer)
        .map(|c| {
            let group = |i: usize| c.get(i).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
            Citation {
                paper_num: group(1),
                paper_title: group(2),
                section: group(3),
                full_citation: group(0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens_test_utils::{paper, paper_with_content, MemoryGraph, StubLlm};
    use pretty_assertions::assert_eq;

    async fn agent(llm: Arc<StubLlm>, papers: &[Paper]) -> QaAgent {
        let graph = MemoryGraph::with_papers("transformers", papers).await;
        QaAgent::new(llm, DatabaseAgent::new(Arc::new(graph)), QaConfig::default())
    }

    #[test]
    fn test_extract_citations() {
        let answer = "Sparse attention helps [Paper 1 - Longformer, Section Method] \
                      and also [Paper 2, Section Results]. See [Paper 3, ].";
        let cites = extract_citations(answer);
        assert_eq!(cites.len(), 3);
        assert_eq!(cites[0].paper_num, "1");
        assert_eq!(cites[0].paper_title, "Longformer");
        assert_eq!(cites[0].section, "Method");
        assert_eq!(cites[1].paper_title, "");
        assert_eq!(cites[1].section, "Results");
        assert_eq!(cites[2].full_citation, "[Paper 3, ]");
    }

    #[tokio::test]
    async fn test_no_papers_skips_llm() {
        let llm = StubLlm::replying("unused");
        let qa = agent(llm.clone(), &[]).await;
        let ans = qa.answer_question("What is new?", &[], None).await.unwrap();
        assert_eq!(ans.answer, NO_PAPERS_ANSWER);
        assert!(ans.papers.is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_question_is_rejected() {
        let qa = agent(StubLlm::replying("x"), &[]).await;
        let err = qa.answer_question("  ", &["1".into()], None).await.unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[tokio::test]
    async fn test_answer_is_cleaned_and_cited() {
        let llm = StubLlm::replying("<think>hmm</think>\nIt uses sparse attention [Paper 1 - Longformer, Section Method].");
        let qa = agent(llm.clone(), &[paper_with_content("2004.05150", "Longformer", 2020)]).await;

        let ans = qa
            .answer_question("How does it scale?", &["2004.05150".into()], None)
            .await
            .unwrap();
        assert_eq!(ans.answer, "It uses sparse attention [Paper 1 - Longformer, Section Method].");
        assert_eq!(ans.citations.len(), 1);
        assert_eq!(ans.papers[0].paper_id, "2004.05150");

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("Title: Longformer"));
        assert!(prompt.contains("Longformer proposes a new architecture."));
        assert!(prompt.contains("Question: How does it scale?"));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_named_in_prompt() {
        let llm = StubLlm::replying("I do not have that paper.");
        let qa = agent(llm.clone(), &[]).await;
        let ans = qa.answer_question("Summarise", &["0000.00000".into()], None).await.unwrap();
        assert!(ans.papers.is_empty());
        assert!(llm.last_prompt().unwrap().contains("ID: 0000.00000"));
    }

    #[tokio::test]
    async fn test_topic_fallback_uses_most_recent_papers() {
        let papers: Vec<Paper> = (0..7).map(|i| paper(&format!("p{i}"), &format!("T{i}"), 2015 + i)).collect();
        let llm = StubLlm::replying("ok");
        let qa = agent(llm.clone(), &papers).await;

        let ans = qa.answer_question("Trends?", &[], Some("transformers")).await.unwrap();
        let ids: Vec<_> = ans.papers.iter().map(|p| p.paper_id.as_str()).collect();
        assert_eq!(ids, vec!["p6", "p5", "p4", "p3", "p2"]);
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let qa = agent(StubLlm::failing(404, "model not found"), &[paper("1", "A", 2023)]).await;
        let err = qa.answer_question("q", &["1".into()], None).await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(_)));
    }

    #[tokio::test]
    async fn test_reasoning_only_reply_is_empty_error() {
        let qa = agent(StubLlm::replying("<think>only thoughts</think>"), &[paper("1", "A", 2023)]).await;
        let err = qa.answer_question("q", &["1".into()], None).await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(paperlens_llm::LlmError::EmptyResponse(_))));
    }

    #[tokio::test]
    async fn test_single_paper_answer() {
        let llm = StubLlm::replying("It improves accuracy.");
        let qa = agent(llm.clone(), &[]).await;
        let p = paper_with_content("1", "Graph Nets", 2021);
        let ans = qa.answer_question_single_paper("What improves?", &p).await.unwrap();
        assert_eq!(ans.answer, "It improves accuracy.");
        assert_eq!(ans.papers, vec![p.to_ref()]);
        assert!(llm.last_prompt().unwrap().contains("Paper Content:\nIntroduction"));
    }
}
