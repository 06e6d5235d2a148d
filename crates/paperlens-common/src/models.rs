//! Paper records shared by the search, graph, and agent layers.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A research paper as returned by arXiv and stored in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub paper_id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub url: Option<String>,
    /// Full PDF text, when it has been fetched.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<PaperSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub figures_tables: Vec<FigureTableRef>,
}

impl Paper {
    pub fn new(paper_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            paper_id: paper_id.into(),
            title: title.into(),
            authors: Vec::new(),
            abstract_text: String::new(),
            published_date: None,
            year: None,
            url: None,
            content: None,
            sections: Vec::new(),
            figures_tables: Vec::new(),
        }
    }

    /// Explicit year, falling back to the publication date.
    pub fn effective_year(&self) -> Option<i32> {
        self.year.or_else(|| self.published_date.map(|d| d.year()))
    }

    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    /// Case-insensitive section lookup.
    pub fn section(&self, name: &str) -> Option<&PaperSection> {
        self.sections.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn authors_joined(&self) -> String {
        if self.authors.is_empty() {
            "Unknown".to_string()
        } else {
            self.authors.join(", ")
        }
    }

    pub fn to_ref(&self) -> PaperRef {
        PaperRef {
            paper_id: self.paper_id.clone(),
            title: self.title.clone(),
            year: self.effective_year(),
        }
    }
}

/// Short reference to a paper, attached to generated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRef {
    pub paper_id: String,
    pub title: String,
    pub year: Option<i32>,
}

/// A detected section of a paper's full text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperSection {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureTableKind {
    Figure,
    Table,
}

/// A "Figure 3: ..." or "Table 1. ..." mention found in the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureTableRef {
    #[serde(rename = "type")]
    pub kind: FigureTableKind,
    pub number: String,
    pub caption: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_effective_year_falls_back_to_date() {
        let mut p = Paper::new("2301.07041v1", "Attention");
        assert_eq!(p.effective_year(), None);
        p.published_date = NaiveDate::from_ymd_opt(2023, 1, 17);
        assert_eq!(p.effective_year(), Some(2023));
        p.year = Some(2022);
        assert_eq!(p.effective_year(), Some(2022));
    }

    #[test]
    fn test_abstract_field_uses_wire_name() {
        let mut p = Paper::new("1", "T");
        p.abstract_text = "An abstract.".into();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["abstract"], "An abstract.");
        assert!(json.get("sections").is_none());

        let back: Paper = serde_json::from_value(json).unwrap();
        assert_eq!(back.abstract_text, "An abstract.");
    }

    #[test]
    fn test_section_lookup_ignores_case() {
        let mut p = Paper::new("1", "T");
        p.sections.push(PaperSection { name: "RESULTS".into(), content: "x".into() });
        assert!(p.section("Results").is_some());
        assert!(p.section("Methods").is_none());
    }
}
