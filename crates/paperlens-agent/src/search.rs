//! Search agent: arXiv lookup and PDF enrichment.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};
use paperlens_common::Paper;
use paperlens_ingestion::sources::arxiv::filter_by_year;
use paperlens_ingestion::{LiteratureSource, PdfProcessor};
use tracing::{info, instrument, warn};

use crate::error::{AgentError, Result};

pub struct SearchAgent {
    source: Arc<dyn LiteratureSource>,
    pdf: Arc<PdfProcessor>,
    /// Pause between consecutive PDF downloads.
    pdf_delay: Duration,
}

impl SearchAgent {
    pub fn new(source: Arc<dyn LiteratureSource>, pdf: Arc<PdfProcessor>, pdf_delay: Duration) -> Self {
        Self { source, pdf, pdf_delay }
    }

    /// Relevance-sorted search, keeping papers from the last `years_back` years.
    #[instrument(skip(self))]
    pub async fn search_arxiv(&self, topic: &str, max_results: usize, years_back: u32) -> Result<Vec<Paper>> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AgentError::Validation("topic must not be empty".to_string()));
        }
        let found = self.source.search(topic, max_results).await?;
        let total = found.len();
        let papers = filter_by_year(found, years_back, Utc::now().year());
        info!(topic, total, kept = papers.len(), "found relevant papers on arXiv");
        Ok(papers)
    }

    /// Attach full text, sections and figure/table mentions to each paper
    /// with a URL. A paper whose PDF fails is kept without content.
    pub async fn process_papers(&self, papers: Vec<Paper>, fetch_content: bool) -> Vec<Paper> {
        if !fetch_content {
            return papers;
        }

        let mut processed = Vec::with_capacity(papers.len());
        let mut downloaded_any = false;
        for mut paper in papers {
            let Some(url) = paper.url.clone() else {
                processed.push(paper);
                continue;
            };

            if downloaded_any && !self.pdf_delay.is_zero() {
                tokio::time::sleep(self.pdf_delay).await;
            }
            downloaded_any = true;

            info!(paper_id = %paper.paper_id, title = %paper.title, "processing paper");
            match self.pdf.process_pdf(&url).await {
                Some(pdf) => {
                    paper.content = Some(pdf.full_text);
                    paper.sections = pdf.sections;
                    paper.figures_tables = pdf.figures_tables;
                }
                None => warn!(paper_id = %paper.paper_id, "failed to process PDF, keeping metadata only"),
            }
            processed.push(paper);
        }
        processed
    }

    pub async fn search_and_process(
        &self,
        topic: &str,
        max_results: usize,
        years_back: u32,
        fetch_content: bool,
    ) -> Result<Vec<Paper>> {
        let papers = self.search_arxiv(topic, max_results, years_back).await?;
        Ok(self.process_papers(papers, fetch_content).await)
    }
}
