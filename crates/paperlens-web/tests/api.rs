//! REST API driven end to end through the router.
//!
//! arXiv is a local stub server, the LLM is `StubLlm` and the graph is the
//! in-memory `PaperGraph`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    routing::get,
    Router,
};
use chrono::{Datelike, Utc};
use paperlens_common::sandbox::SandboxClient;
use paperlens_config::Config;
use paperlens_ingestion::{ArxivClient, PdfProcessor};
use paperlens_test_utils::{paper, paper_with_content, spawn_stub_server, MemoryGraph, StubLlm};
use paperlens_web::{router::build_router, state::AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

fn feed(base: &str) -> String {
    let year = Utc::now().year();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <published>{year}-02-01T00:00:00Z</published>
    <title>Recent Graph Paper</title>
    <summary>Graphs, recently.</summary>
    <author><name>Grace Hopper</name></author>
    <link title="pdf" href="{base}/pdf/2401.00001v1.pdf" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/0901.00001v1</id>
    <published>2009-01-02T00:00:00Z</published>
    <title>Old Graph Paper</title>
    <summary>Graphs, long ago.</summary>
  </entry>
</feed>"#
    )
}

/// Stub arXiv: the Atom API plus a "PDF" that lopdf cannot parse.
async fn arxiv_stub() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let body = feed(&base);
    let app = Router::new()
        .route("/api/query", get(move || async move { body }))
        .route(
            "/pdf/{file}",
            get(|| async { ([(header::CONTENT_TYPE, "application/pdf")], "not really a pdf") }),
        );
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("{}/api/query", base)
}

async fn failing_arxiv() -> String {
    let app = Router::new().route(
        "/api/query",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "rate limited") }),
    );
    format!("{}/api/query", spawn_stub_server(app).await)
}

fn app(arxiv_url: &str, llm: Arc<StubLlm>, graph: Arc<MemoryGraph>) -> Router {
    let mut config = Config::default();
    config.arxiv.pdf_fetch_delay_ms = 0;
    let arxiv = ArxivClient::new(arxiv_url, Duration::from_secs(5)).unwrap();
    let pdf = PdfProcessor::new(SandboxClient::new().unwrap());
    build_router(AppState::new(&config, llm, graph, Arc::new(arxiv), pdf))
}

async fn offline_app(llm: Arc<StubLlm>, graph: Arc<MemoryGraph>) -> Router {
    app(&failing_arxiv().await, llm, graph)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_banner_and_health() {
    let app = offline_app(StubLlm::replying("x"), Arc::new(MemoryGraph::new())).await;

    let (status, body) = send(app.clone(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("running"));

    let (status, body) = send(app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_search_without_content_stores_inline() {
    let graph = Arc::new(MemoryGraph::new());
    let app = app(&arxiv_stub().await, StubLlm::replying("x"), graph.clone());

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/search",
        Some(json!({"topic": "graph learning", "fetch_content": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stored 1 papers.");
    assert_eq!(body["papers"][0]["paper_id"], "2401.00001v1");
    assert_eq!(body["papers"][0]["abstract"], "Graphs, recently.");

    let (status, body) = send(app, Method::GET, "/papers/graph%20learning", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], "graph learning");
    assert_eq!(body["paper_count"], 1);
    assert_eq!(body["papers"][0]["title"], "Recent Graph Paper");
}

#[tokio::test]
async fn test_search_with_content_stores_in_background() {
    let graph = Arc::new(MemoryGraph::new());
    let app = app(&arxiv_stub().await, StubLlm::replying("x"), graph.clone());

    let (status, body) = send(app, Method::POST, "/search", Some(json!({"topic": "graphs"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Processing 1 papers in background.");

    let mut stored = 0;
    for _ in 0..100 {
        stored = graph.paper_count().await;
        if stored > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn test_search_validation_and_upstream_failure() {
    let app = offline_app(StubLlm::replying("x"), Arc::new(MemoryGraph::new())).await;

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/search",
        Some(json!({"topic": "x", "max_results": 51})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("max_results"));

    let (status, body) = send(app.clone(), Method::POST, "/search", Some(json!({"topic": "  "}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, body) = send(app, Method::POST, "/search", Some(json!({"topic": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("rate limited"));
}

#[tokio::test]
async fn test_paper_lookup_topics_and_clear() {
    let graph = Arc::new(
        MemoryGraph::with_papers("vision", &[paper("1", "Old", 2015), paper("2", "New", 2023)]).await,
    );
    let app = offline_app(StubLlm::replying("x"), graph).await;

    let (status, body) = send(app.clone(), Method::GET, "/paper/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "New");

    let (status, body) = send(app.clone(), Method::GET, "/paper/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Paper not found: nope");

    let (_, body) = send(app.clone(), Method::GET, "/papers/vision?year_from=2020", None).await;
    assert_eq!(body["paper_count"], 1);

    let (status, _) = send(app.clone(), Method::GET, "/papers/vision?year_to=2200", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(app.clone(), Method::GET, "/topics", None).await;
    assert_eq!(body, json!({"topics": ["vision"]}));

    let (status, body) = send(app.clone(), Method::DELETE, "/topics/vision", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"topic": "vision", "cleared": 2}));

    let (_, body) = send(app, Method::GET, "/papers/vision", None).await;
    assert_eq!(body["paper_count"], 0);
}

#[tokio::test]
async fn test_qa_returns_flat_answer_with_citations() {
    let llm = StubLlm::replying("<think>let me see</think>It adds accuracy [Paper 1 - Graph Nets, Section Results].");
    let graph = Arc::new(MemoryGraph::with_papers("gnn", &[paper_with_content("g1", "Graph Nets", 2022)]).await);
    let app = offline_app(llm.clone(), graph).await;

    let (status, body) = send(
        app,
        Method::POST,
        "/qa",
        Some(json!({"question": "What improves?", "paper_ids": ["g1"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"], "What improves?");
    assert_eq!(body["answer"], "It adds accuracy [Paper 1 - Graph Nets, Section Results].");
    assert_eq!(body["citations"][0]["section"], "Results");
    assert_eq!(body["papers"][0]["paper_id"], "g1");
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_qa_without_papers_and_llm_failure() {
    let app = offline_app(StubLlm::replying("unused"), Arc::new(MemoryGraph::new())).await;
    let (status, body) = send(app, Method::POST, "/qa", Some(json!({"question": "Anything?"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "No papers provided for reference.");

    let graph = Arc::new(MemoryGraph::with_papers("gnn", &[paper("g1", "Graph Nets", 2022)]).await);
    let app = offline_app(StubLlm::failing(500, "model crashed"), graph).await;
    let (status, body) = send(
        app,
        Method::POST,
        "/qa",
        Some(json!({"question": "Why?", "paper_ids": ["g1"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("model crashed"));
}

#[tokio::test]
async fn test_future_works_kinds() {
    let llm = StubLlm::replying("1. Scale it up.");
    let graph = Arc::new(
        MemoryGraph::with_papers("gnn", &[paper_with_content("g1", "Graph Nets", Utc::now().year())]).await,
    );
    let app = offline_app(llm.clone(), graph).await;

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/generate-future-works",
        Some(json!({"topic": "gnn", "kind": "improvement_plan"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["future_work"], "1. Scale it up.");
    assert_eq!(body["kind"], "improvement_plan");
    assert_eq!(body["based_on_papers"][0]["paper_id"], "g1");
    assert!(llm.last_prompt().unwrap().contains("research director"));

    let (status, body) = send(
        app.clone(),
        Method::POST,
        "/generate-future-works",
        Some(json!({"topic": "unknown topic", "years_back": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["based_on_papers"], json!([]));
    assert_eq!(
        llm.last_prompt().unwrap(),
        "Generate future research ideas for the topic: unknown topic based on research from the past 2 years."
    );

    let (status, _) = send(
        app.clone(),
        Method::POST,
        "/generate-future-works",
        Some(json!({"topic": "gnn", "years_back": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        app,
        Method::POST,
        "/generate-future-works",
        Some(json!({"topic": "gnn", "kind": "sonnet"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_ui_pages_render() {
    let graph = Arc::new(MemoryGraph::with_papers("robotics <arms>", &[paper("r1", "Arms", 2024)]).await);
    let app = offline_app(StubLlm::replying("x"), graph).await;

    for uri in ["/ui", "/ui/search", "/ui/qa", "/ui/future-works"] {
        let resp = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Paperlens"));
        if uri == "/ui" {
            assert!(html.contains("robotics &lt;arms&gt;"));
        }
    }
}

#[tokio::test]
async fn test_malformed_requests_answer_with_detail() {
    let app = offline_app(StubLlm::replying("x"), Arc::new(MemoryGraph::new())).await;

    let (status, body) = send(app.clone(), Method::GET, "/papers/vision?year_from=abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("query string"));

    let (status, body) = send(app.clone(), Method::POST, "/qa", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("question"));

    let (status, body) = send(
        app,
        Method::POST,
        "/search",
        Some(json!({"topic": "x", "max_results": "ten"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("max_results"));
}
