//! Shared test doubles: a scripted LLM, paper and PDF fixtures, and local stub
//! HTTP servers standing in for arXiv or an LLM endpoint.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use paperlens_common::{Paper, PaperSection};
use paperlens_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse};

pub use paperlens_kg::MemoryGraph;

/// LLM double that returns a fixed reply and records every prompt it sees.
pub struct StubLlm {
    reply: Result<String, (u16, String)>,
    context_tokens: usize,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            context_tokens: 32768,
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Every call fails with `LlmError::ApiError { status, message }`.
    pub fn failing(status: u16, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Err((status, message.into())),
            context_tokens: 32768,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmBackend for StubLlm {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let prompt = req
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        match &self.reply {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                model: "stub-model".to_string(),
                prompt_tokens: 0,
                completion_tokens: 0,
            }),
            Err((status, message)) => Err(LlmError::ApiError {
                status: *status,
                message: message.clone(),
            }),
        }
    }

    fn model_id(&self) -> &str { "stub-model" }
    fn backend_name(&self) -> &'static str { "stub" }
    fn is_local(&self) -> bool { true }
    fn max_context_tokens(&self) -> usize { self.context_tokens }
}

/// A paper with metadata only.
pub fn paper(id: &str, title: &str, year: i32) -> Paper {
    let mut p = Paper::new(id, title);
    p.authors = vec!["Ada Lovelace".to_string(), "Alan Turing".to_string()];
    p.abstract_text = format!("Abstract of {}.", title);
    p.published_date = NaiveDate::from_ymd_opt(year, 6, 1);
    p.year = Some(year);
    p.url = Some(format!("http://arxiv.org/pdf/{}", id));
    p
}

/// A paper with full text split into the usual sections.
pub fn paper_with_content(id: &str, title: &str, year: i32) -> Paper {
    let mut p = paper(id, title, year);
    let sections = [
        ("Introduction", format!("Introduction\n{} motivates the problem.", title)),
        ("Method", format!("Method\n{} proposes a new architecture.", title)),
        ("Results", format!("Results\n{} improves accuracy by 3 points.", title)),
        ("Conclusion", format!("Conclusion\n{} leaves scaling open.", title)),
    ];
    p.content = Some(
        sections
            .iter()
            .map(|(_, c)| c.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    );
    p.sections = sections
        .into_iter()
        .map(|(name, content)| PaperSection { name: name.to_string(), content })
        .collect();
    p
}

/// A one-page PDF with each of `lines` in its own text object, so text
/// extraction yields one line per entry.
pub fn sample_pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new("Td", vec![50.into(), (750 - 20 * i as i64).into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode page content"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialise sample PDF");
    bytes
}

/// Serve `app` on an ephemeral loopback port and return its base URL.
pub async fn spawn_stub_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{}", addr)
}
