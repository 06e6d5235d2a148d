//! Prompt templates. Pure string builders, no I/O.

use paperlens_common::{Paper, PaperSection};
use paperlens_ingestion::chunker::truncate_chars;
use paperlens_ingestion::pdf::extract_sections;

/// One paper's slot in a multi-paper Q&A prompt.
pub enum PaperContext<'a> {
    /// A stored paper plus the part of its text that fits the budget.
    Found { paper: &'a Paper, excerpt: String },
    /// An id the graph does not know.
    Missing(&'a str),
}

fn year_label(paper: &Paper) -> String {
    paper
        .effective_year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Unknown Year".to_string())
}

fn abstract_label(paper: &Paper) -> &str {
    if paper.abstract_text.trim().is_empty() {
        "No abstract available"
    } else {
        &paper.abstract_text
    }
}

fn title_label(paper: &Paper) -> &str {
    if paper.title.trim().is_empty() { "Unknown Title" } else { &paper.title }
}

/// Numbered summary block shared by all multi-paper prompts.
fn paper_block(number: usize, paper: &Paper) -> String {
    format!(
        "\nPaper {}:\nTitle: {}\nAuthors: {}\nYear: {}\nAbstract: {}\n",
        number,
        title_label(paper),
        paper.authors_joined(),
        year_label(paper),
        abstract_label(paper),
    )
}

/// Truncate with a marker when `text` exceeds `max_chars`.
fn clip(text: &str, max_chars: usize, marker: &str) -> String {
    let cut = truncate_chars(text, max_chars);
    if cut.len() < text.len() {
        format!("{}{}", cut, marker)
    } else {
        text.to_string()
    }
}

/// Sections of a paper, re-detected from stored content when the paper
/// carries none (sections are not persisted in the graph).
pub fn sections_of(paper: &Paper) -> Vec<PaperSection> {
    if !paper.sections.is_empty() {
        return paper.sections.clone();
    }
    match paper.content.as_deref() {
        Some(text) if !text.trim().is_empty() => extract_sections(text),
        _ => Vec::new(),
    }
}

/// `\n{Name}: {excerpt}` for each named section present, in the given order.
pub fn section_excerpts(sections: &[PaperSection], names: &[&str], max_chars: usize) -> String {
    let mut out = String::new();
    for name in names {
        if let Some(s) = sections.iter().find(|s| s.name.eq_ignore_ascii_case(name)) {
            out.push_str(&format!("\n{}: {}", name, clip(&s.content, max_chars, "... [truncated]")));
        }
    }
    out
}

// ── Q&A ──────────────────────────────────────────────────────────────────────

pub fn qa_prompt(question: &str, papers: &[PaperContext<'_>]) -> String {
    let mut prompt = String::from(
        "You are an academic research assistant. Answer the question using only the papers \
         provided below. If the answer is not found in them, state that clearly. When you use \
         information from a paper, cite it as [Paper N - Title, Section S].\n",
    );

    for (i, ctx) in papers.iter().enumerate() {
        match ctx {
            PaperContext::Found { paper, excerpt } => {
                prompt.push_str(&paper_block(i + 1, paper));
                if excerpt.trim().is_empty() {
                    prompt.push_str("Content: full text not available, use the abstract.\n");
                } else {
                    prompt.push_str(&format!("Content:\n{}\n", excerpt));
                }
            }
            PaperContext::Missing(id) => {
                prompt.push_str(&format!(
                    "\nPaper {}:\nID: {}\nThis paper is not in the database; its text is not available.\n",
                    i + 1,
                    id
                ));
            }
        }
    }

    prompt.push_str(&format!("\nQuestion: {}\n", question));
    prompt
}

pub fn single_paper_prompt(question: &str, paper: &Paper, max_content_chars: usize) -> String {
    let content = paper
        .content
        .as_deref()
        .map(|c| clip(c, max_content_chars, "... [content truncated]"))
        .unwrap_or_default();

    format!(
        "You are an academic research assistant. I will provide you with details from a research paper, \
         and you need to answer a specific question about it. Please only use information contained in this paper \
         to answer the question. If the answer is not found in the paper, state that clearly.\n\n\
         Paper Details:\n\
         Title: {}\n\
         Authors: {}\n\
         Year: {}\n\
         Abstract: {}\n\n\
         Question: {}\n\n\
         Paper Content:\n{}\n\n\
         Please provide a complete and accurate answer based only on the information in this paper.\n",
        title_label(paper),
        paper.authors_joined(),
        year_label(paper),
        abstract_label(paper),
        question,
        content,
    )
}

// ── Future works ─────────────────────────────────────────────────────────────

pub fn plain_future_work_prompt(topic: &str, years_back: u32) -> String {
    format!(
        "Generate future research ideas for the topic: {} based on research from the past {} years.",
        topic, years_back
    )
}

pub fn ideas_prompt(topic: &str, papers: &[Paper]) -> String {
    let summaries: String = papers
        .iter()
        .enumerate()
        .map(|(i, p)| paper_block(i + 1, p))
        .collect();

    format!(
        "You are an expert academic researcher in the field of {topic}. Based on the recent papers I'll provide, \
         generate 5-7 promising ideas for future research directions. These ideas should build upon the current \
         state of the art and address gaps or open challenges in the field.\n\n\
         Recent papers in {topic}:\n{summaries}\n\
         For each research idea:\n\
         1. Provide a clear title for the potential research\n\
         2. Explain the key concept and approach\n\
         3. Describe why this direction is promising and how it addresses limitations in current research\n\
         4. Suggest potential methods or techniques that could be used\n\
         5. Note potential challenges or obstacles to overcome\n\n\
         Focus on novel, impactful ideas that could lead to significant advancements. Be specific rather than general.\n"
    )
}

const REVIEW_SECTIONS: [&str; 5] = ["Introduction", "Method", "Methodology", "Results", "Conclusion"];
const FINDING_SECTIONS: [&str; 3] = ["Results", "Conclusion", "Discussion"];

pub fn review_prompt(topic: &str, papers: &[Paper]) -> String {
    let summaries: String = papers
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let excerpts = section_excerpts(&sections_of(p), &REVIEW_SECTIONS, 1000);
            format!("{}{}\n", paper_block(i + 1, p), excerpts)
        })
        .collect();

    format!(
        "You are an expert academic researcher tasked with writing a comprehensive review paper on {topic}. \
         Based on the papers I'll provide, create a well-structured review paper that summarizes the current state \
         of research and suggests future directions.\n\n\
         The review paper should have the following sections:\n\
         1. Title: An appropriate title for a review paper on {topic}\n\
         2. Abstract: A concise summary of the review paper\n\
         3. Introduction: Overview of the field and importance of the topic\n\
         4. Background: Key concepts and foundational knowledge\n\
         5. Current Approaches: Analysis of the main approaches and methods in the field\n\
         6. Comparative Analysis: Comparison of different methods and their strengths/weaknesses\n\
         7. Open Challenges: Discussion of unsolved problems and limitations\n\
         8. Future Directions: Promising research directions and opportunities\n\
         9. Conclusion: Summary of the state of the field and outlook\n\n\
         Papers to review:\n{summaries}\n\
         Write a scholarly review paper based on these papers. Use academic language and be specific about methods, \
         findings, and gaps in the research. When referencing specific papers, cite them by their number (e.g., [1]).\n"
    )
}

pub fn improvement_plan_prompt(topic: &str, papers: &[Paper]) -> String {
    let summaries: String = papers
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let findings = section_excerpts(&sections_of(p), &FINDING_SECTIONS, 800);
            format!("{}Key Findings: {}\n", paper_block(i + 1, p), findings)
        })
        .collect();

    format!(
        "You are a research director at a top institution, specializing in {topic}. Your task is to develop a \
         comprehensive improvement plan that builds upon existing research to make significant advances in the field.\n\n\
         Based on the recent papers I'll provide, create a strategic research and development plan that:\n\
         1. Identifies key limitations and gaps in current approaches\n\
         2. Proposes novel solutions and methodologies to address these limitations\n\
         3. Outlines concrete steps for implementing these improvements\n\
         4. Describes expected outcomes and potential impact\n\n\
         Recent papers in {topic}:\n{summaries}\n\
         Your improvement plan should be innovative yet practical, with specific technical details rather than \
         general suggestions. The plan should be well-structured with clear sections and actionable items. \
         When referencing specific papers, cite them by their number (e.g., [1]).\n"
    )
}
