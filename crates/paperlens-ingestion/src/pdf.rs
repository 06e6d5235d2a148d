//! PDF download and structure extraction.
//!
//! Text comes from lopdf page extraction; sections and figure/table mentions
//! are detected with regex heuristics over the plain text.

use std::sync::OnceLock;

use lopdf::Document as PdfDoc;
use paperlens_common::sandbox::SandboxClient as Client;
use paperlens_common::{FigureTableKind, FigureTableRef, PaperSection, PaperlensError, Result};
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument, warn};

/// Section name used when no known header is found.
pub const FULL_TEXT_SECTION: &str = "Full Text";

/// Output of [`PdfProcessor::process_pdf`].
#[derive(Debug, Clone)]
pub struct ProcessedPdf {
    pub full_text: String,
    pub sections: Vec<PaperSection>,
    pub figures_tables: Vec<FigureTableRef>,
}

pub struct PdfProcessor {
    client: Client,
}

impl PdfProcessor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch a PDF. Responses that are neither `application/pdf` nor served
    /// from a `.pdf` URL are rejected.
    #[instrument(skip(self))]
    pub async fn download_pdf(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url)?.send().await?.error_for_status()?;

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.contains("application/pdf") && !url.to_lowercase().ends_with(".pdf") {
            return Err(PaperlensError::Pdf(format!(
                "URL does not point to a PDF: {} (Content-Type: {})",
                url, content_type
            )));
        }

        let bytes = resp.bytes().await?;
        debug!(bytes = bytes.len(), "downloaded PDF");
        Ok(bytes.to_vec())
    }

    /// Download and extract. Any failure is logged and yields `None`.
    pub async fn process_pdf(&self, url: &str) -> Option<ProcessedPdf> {
        let bytes = match self.download_pdf(url).await {
            Ok(b) => b,
            Err(e) => {
                warn!(%url, error = %e, "PDF download failed");
                return None;
            }
        };

        // lopdf parsing is CPU-bound
        let parsed = tokio::task::spawn_blocking(move || extract_text(&bytes)).await;
        let full_text = match parsed {
            Ok(Ok(text)) if !text.trim().is_empty() => text,
            Ok(Ok(_)) => {
                warn!(%url, "PDF contained no extractable text");
                return None;
            }
            Ok(Err(e)) => {
                warn!(%url, error = %e, "PDF text extraction failed");
                return None;
            }
            Err(e) => {
                warn!(%url, error = %e, "PDF extraction task panicked");
                return None;
            }
        };

        Some(ProcessedPdf {
            sections: extract_sections(&full_text),
            figures_tables: extract_figures_and_tables(&full_text),
            full_text,
        })
    }
}

/// Extract text from every page, pages separated by a blank line.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let doc = PdfDoc::load_mem(bytes).map_err(|e| PaperlensError::Pdf(e.to_string()))?;
    let mut text = String::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push_str("\n\n");
            }
            Err(e) => debug!(page = page_num, error = %e, "skipping unreadable page"),
        }
    }
    Ok(text)
}

fn section_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:^|\n)(Abstract|Introduction|Related Work|Background|Methodology|Method|Approach|Experiments?|Evaluation|Results? (?:and|&) Discussion|Results?|Discussion|Conclusions?|Future Work|References|Appendix)(?:\s|:)",
        )
        .unwrap()
    })
}

fn figure_ref() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:Figure|Fig\.?)\s+(\d+)[:.]?\s*([^.]+)").unwrap())
}

fn table_ref() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Table\s+(\d+)[:.]?\s*([^.]+)").unwrap())
}

/// Split paper text at known section headers. Each section runs from its
/// header to the next one. A header seen twice keeps the later content.
pub fn extract_sections(text: &str) -> Vec<PaperSection> {
    let matches: Vec<_> = section_header().captures_iter(text).collect();
    let mut sections: Vec<PaperSection> = Vec::new();

    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else { continue };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        let content = text[whole.start()..end].trim().to_string();
        let name = name.as_str().to_string();

        match sections.iter_mut().find(|s| s.name.eq_ignore_ascii_case(&name)) {
            Some(existing) => existing.content = content,
            None => sections.push(PaperSection { name, content }),
        }
    }

    if sections.is_empty() {
        sections.push(PaperSection {
            name: FULL_TEXT_SECTION.to_string(),
            content: text.to_string(),
        });
    }
    sections
}

/// Figure mentions first, then table mentions, each in text order.
pub fn extract_figures_and_tables(text: &str) -> Vec<FigureTableRef> {
    let collect = |re: &Regex, kind: FigureTableKind| {
        re.captures_iter(text)
            .filter_map(|c| {
                Some(FigureTableRef {
                    kind,
                    number: c.get(1)?.as_str().to_string(),
                    caption: c.get(2)?.as_str().trim().to_string(),
                    text: c.get(0)?.as_str().to_string(),
                })
            })
            .collect::<Vec<_>>()
    };

    let mut refs = collect(figure_ref(), FigureTableKind::Figure);
    refs.extend(collect(table_ref(), FigureTableKind::Table));
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sections_split_at_headers() {
        let text = "Efficient Attention\nAbstract\nWe study attention.\nIntroduction\nTransformers are big.\n\
                    Results and Discussion\nIt works.\nConclusion: done.";
        let sections = extract_sections(text);
        let names: Vec<_> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Abstract", "Introduction", "Results and Discussion", "Conclusion"]);
        assert_eq!(sections[1].content, "Introduction\nTransformers are big.");
        assert_eq!(sections[3].content, "Conclusion: done.");
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let sections = extract_sections("\nMETHODOLOGY\nwe did things\nREFERENCES\n[1] x");
        assert_eq!(sections[0].name, "METHODOLOGY");
        assert_eq!(sections[1].name, "REFERENCES");
    }

    #[test]
    fn test_no_headers_yields_full_text() {
        let sections = extract_sections("just some prose without structure");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, FULL_TEXT_SECTION);
        assert_eq!(sections[0].content, "just some prose without structure");
    }

    #[test]
    fn test_repeated_header_keeps_last() {
        let sections = extract_sections("Introduction\nfirst\nIntroduction\nsecond");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "Introduction\nsecond");
    }

    #[test]
    fn test_figures_and_tables() {
        let text = "As shown in Figure 2: accuracy over epochs. See Fig. 3 loss curve. Table 1. Benchmark results.";
        let refs = extract_figures_and_tables(text);
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].kind, FigureTableKind::Figure);
        assert_eq!(refs[0].number, "2");
        assert_eq!(refs[0].caption, "accuracy over epochs");
        assert_eq!(refs[1].number, "3");
        assert_eq!(refs[1].caption, "loss curve");
        assert_eq!(refs[2].kind, FigureTableKind::Table);
        assert_eq!(refs[2].caption, "Benchmark results");
    }

    #[test]
    fn test_garbage_bytes_are_pdf_error() {
        let err = extract_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PaperlensError::Pdf(_)));
    }
}
