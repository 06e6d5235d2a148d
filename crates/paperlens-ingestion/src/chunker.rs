//! Section-aware word-window chunker.
//!
//! Used to fit paper text into a prompt budget: the Q&A agent takes chunks in
//! document order until the per-paper character budget is spent.

use paperlens_common::Paper;

use crate::pdf::extract_sections;

/// Configuration for the chunker.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum tokens per chunk.
    pub max_tokens: usize,
    /// Token overlap between consecutive chunks of one section.
    pub overlap_tokens: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            overlap_tokens: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub index: usize,
    pub section: String,
    pub content: String,
    pub token_count: usize,
}

/// Chunk a paper's full text. Uses the paper's detected sections when present,
/// otherwise re-detects them from `content`. Papers without content give no chunks.
pub fn chunk_paper(paper: &Paper, config: &ChunkerConfig) -> Vec<TextChunk> {
    let detected;
    let sections = if !paper.sections.is_empty() {
        &paper.sections
    } else {
        match paper.content.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                detected = extract_sections(text);
                &detected
            }
            _ => return Vec::new(),
        }
    };

    let mut chunks = Vec::new();
    for section in sections {
        chunk_section(&section.name, &section.content, config, &mut chunks);
    }
    chunks
}

fn chunk_section(name: &str, text: &str, config: &ChunkerConfig, out: &mut Vec<TextChunk>) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return;
    }

    // Approximate: 1 token ≈ 0.75 words
    let words_per_chunk = ((config.max_tokens as f32 * 0.75) as usize).max(1);
    let overlap_words   = (config.overlap_tokens as f32 * 0.75) as usize;
    let step = words_per_chunk.saturating_sub(overlap_words).max(1);

    let mut start = 0;
    while start < words.len() {
        let end = (start + words_per_chunk).min(words.len());
        let content = words[start..end].join(" ");
        out.push(TextChunk {
            index: out.len(),
            section: name.to_string(),
            token_count: estimate_tokens(&content),
            content,
        });
        if end == words.len() {
            break;
        }
        start += step;
    }
}

/// Rough token estimation: words / 0.75.
pub fn estimate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    ((words as f32) / 0.75).ceil() as usize
}

/// Concatenate chunks in order while they fit in `max_chars`. If even the
/// first chunk is too long, its prefix is used.
pub fn fit_chunks(chunks: &[TextChunk], max_chars: usize) -> String {
    let mut out = String::new();
    for chunk in chunks {
        let sep = if out.is_empty() { 0 } else { 2 };
        if out.chars().count() + sep + chunk.content.chars().count() > max_chars {
            if out.is_empty() {
                out.push_str(truncate_chars(&chunk.content, max_chars));
            }
            break;
        }
        if sep > 0 {
            out.push_str("\n\n");
        }
        out.push_str(&chunk.content);
    }
    out
}

/// Longest prefix of `s` with at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
