//! arXiv Atom API client.
//!
//! Endpoint: http://export.arxiv.org/api/query
//!   search_query=ti:<topic> OR abs:<topic>, sortBy=relevance

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use paperlens_common::sandbox::SandboxClient as Client;
use paperlens_common::{Paper, PaperlensError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, instrument};

use super::LiteratureSource;

pub const DEFAULT_API_URL: &str = "http://export.arxiv.org/api/query";

pub struct ArxivClient {
    client: Client,
    api_url: String,
}

impl ArxivClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_url = api_url.into();
        let mut client = Client::with_timeout(timeout)?;
        client.allow_url_host(&api_url)?;
        Ok(Self { client, api_url })
    }
}

#[async_trait]
impl LiteratureSource for ArxivClient {
    #[instrument(skip(self))]
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>> {
        let query = build_query(topic);
        debug!(%query, "querying arXiv");

        let params = [
            ("search_query", query),
            ("start", "0".to_string()),
            ("max_results", max_results.to_string()),
            ("sortBy", "relevance".to_string()),
            ("sortOrder", "descending".to_string()),
        ];

        let resp = self.client
            .get(&self.api_url)?
            .query(&params)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(PaperlensError::Upstream {
                status: status.as_u16(),
                message: format!("arXiv query failed: {}", body.trim()),
            });
        }

        parse_arxiv_feed(&body)
    }
}

/// `ti:topic OR abs:topic`, with multi-word topics quoted as phrases.
pub fn build_query(topic: &str) -> String {
    let topic = topic.trim();
    let term = if topic.contains(char::is_whitespace) {
        format!("\"{}\"", topic.replace('"', ""))
    } else {
        topic.to_string()
    };
    format!("ti:{term} OR abs:{term}")
}

/// Drop papers published before `current_year - years_back`, or undated.
pub fn filter_by_year(papers: Vec<Paper>, years_back: u32, current_year: i32) -> Vec<Paper> {
    let lower = current_year - years_back as i32;
    papers
        .into_iter()
        .filter(|p| p.effective_year().is_some_and(|y| y >= lower))
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

/// Parse an arXiv Atom feed into papers.
/// An arXiv error entry (id under `/api/errors`) becomes an upstream error.
pub fn parse_arxiv_feed(xml: &str) -> Result<Vec<Paper>> {
    let mut papers = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current: Option<Paper> = None;
    let mut abs_id = String::new();
    let mut field = Field::None;
    let mut in_author = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                match e.local_name().as_ref() {
                    b"entry" => {
                        current = Some(Paper::new(String::new(), String::new()));
                        abs_id.clear();
                    }
                    b"author" => in_author = true,
                    b"link" => {
                        if let Some(p) = current.as_mut() {
                            read_pdf_link(e, p);
                        }
                    }
                    name if current.is_some() => {
                        field = match name {
                            b"id" => Field::Id,
                            b"title" => Field::Title,
                            b"summary" => Field::Summary,
                            b"published" => Field::Published,
                            b"name" if in_author => Field::AuthorName,
                            _ => Field::None,
                        };
                        text.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"link" {
                    if let Some(p) = current.as_mut() {
                        read_pdf_link(e, p);
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if field != Field::None {
                    let chunk = e.unescape().map_err(|err| PaperlensError::Xml(err.to_string()))?;
                    text.push_str(&chunk);
                }
            }
            Ok(Event::CData(ref e)) => {
                if field != Field::None {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(ref e)) => {
                match e.local_name().as_ref() {
                    b"author" => in_author = false,
                    b"entry" => {
                        if let Some(mut p) = current.take() {
                            if abs_id.contains("/api/errors") {
                                return Err(PaperlensError::Upstream {
                                    status: 400,
                                    message: format!("arXiv rejected the query: {}", p.abstract_text),
                                });
                            }
                            if p.url.is_none() && !abs_id.is_empty() {
                                p.url = Some(abs_id.replacen("/abs/", "/pdf/", 1));
                            }
                            if p.paper_id.is_empty() || p.title.is_empty() {
                                debug!(id = %abs_id, "skipping arXiv entry without id or title");
                            } else {
                                papers.push(p);
                            }
                        }
                    }
                    _ => {
                        if let Some(p) = current.as_mut() {
                            apply_field(p, field, &text, &mut abs_id);
                        }
                        field = Field::None;
                        text.clear();
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PaperlensError::Xml(format!(
                    "arXiv feed error at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(papers)
}

fn apply_field(p: &mut Paper, field: Field, raw: &str, abs_id: &mut String) {
    match field {
        Field::None => {}
        Field::Id => {
            *abs_id = raw.trim().to_string();
            p.paper_id = abs_id
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string();
        }
        Field::Title => p.title = normalise_whitespace(raw),
        Field::Summary => p.abstract_text = normalise_whitespace(raw),
        Field::Published => {
            let raw = raw.trim();
            p.published_date = raw
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
            p.year = p.published_date.map(|d| d.year());
        }
        Field::AuthorName => {
            let name = normalise_whitespace(raw);
            if !name.is_empty() {
                p.authors.push(name);
            }
        }
    }
}

fn read_pdf_link(e: &BytesStart<'_>, p: &mut Paper) {
    let mut is_pdf = false;
    let mut href = None;
    for attr in e.attributes().flatten() {
        let value = attr.unescape_value().map(|v| v.into_owned()).unwrap_or_default();
        match attr.key.as_ref() {
            b"title" if value == "pdf" => is_pdf = true,
            b"type" if value == "application/pdf" => is_pdf = true,
            b"href" => href = Some(value),
            _ => {}
        }
    }
    if is_pdf {
        if let Some(h) = href {
            p.url = Some(h);
        }
    }
}

fn normalise_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
