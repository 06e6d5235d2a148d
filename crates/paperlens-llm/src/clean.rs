//! Post-processing of raw model output.

use std::sync::OnceLock;

use regex::Regex;

fn think_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").unwrap())
}

/// Remove `<think>…</think>` reasoning blocks emitted by reasoning models
/// and trim the remainder. An unterminated `<think>` drops everything after it.
pub fn strip_reasoning(raw: &str) -> String {
    let cleaned = think_block().replace_all(raw, "");
    let cleaned = match cleaned.find("<think>") {
        Some(idx) => &cleaned[..idx],
        None => &cleaned[..],
    };
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_multiline_block() {
        let raw = "<think>\nlet me consider\nthe papers\n</think>\n\nThe answer is [Paper 1, Section Results].";
        assert_eq!(strip_reasoning(raw), "The answer is [Paper 1, Section Results].");
    }

    #[test]
    fn test_removes_every_block() {
        let raw = "<think>a</think>First. <think>b</think>Second.";
        assert_eq!(strip_reasoning(raw), "First. Second.");
    }

    #[test]
    fn test_plain_text_is_only_trimmed() {
        assert_eq!(strip_reasoning("  plain answer \n"), "plain answer");
    }

    #[test]
    fn test_unterminated_block_is_dropped() {
        assert_eq!(strip_reasoning("Answer.<think>still going"), "Answer.");
    }
}
