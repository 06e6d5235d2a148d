//! arXiv client against a local stub of the Atom API.

use std::time::Duration;

use axum::{extract::Query, http::StatusCode, routing::get, Router};
use paperlens_common::PaperlensError;
use paperlens_ingestion::sources::arxiv::filter_by_year;
use paperlens_ingestion::sources::LiteratureSource;
use paperlens_ingestion::ArxivClient;
use std::collections::HashMap;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2401.00001v2</id>
    <published>2099-01-02T00:00:00Z</published>
    <title>Future Paper</title>
    <summary>From the future.</summary>
    <author><name>A. Author</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/0901.00001v1</id>
    <published>2009-01-02T00:00:00Z</published>
    <title>Old Paper</title>
    <summary>From the past.</summary>
  </entry>
</feed>"#;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{}/api/query", addr)
}

#[tokio::test]
async fn test_search_sends_query_and_parses_feed() {
    let app = Router::new().route(
        "/api/query",
        get(|Query(q): Query<HashMap<String, String>>| async move {
            assert_eq!(q["search_query"], "ti:\"neural fields\" OR abs:\"neural fields\"");
            assert_eq!(q["max_results"], "7");
            assert_eq!(q["sortBy"], "relevance");
            FEED
        }),
    );
    let client = ArxivClient::new(spawn(app).await, Duration::from_secs(5)).unwrap();

    let papers = client.search("neural fields", 7).await.unwrap();
    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].paper_id, "2401.00001v2");
    assert_eq!(papers[0].url.as_deref(), Some("http://arxiv.org/pdf/2401.00001v2"));
}

#[tokio::test]
async fn test_year_filter_drops_old_papers() {
    let app = Router::new().route("/api/query", get(|| async { FEED }));
    let client = ArxivClient::new(spawn(app).await, Duration::from_secs(5)).unwrap();

    let papers = client.search("fields", 10).await.unwrap();
    let papers = filter_by_year(papers, 5, 2025);
    let titles: Vec<_> = papers.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Future Paper"]);
}

#[tokio::test]
async fn test_http_failure_propagates() {
    let app = Router::new().route(
        "/api/query",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "try later") }),
    );
    let client = ArxivClient::new(spawn(app).await, Duration::from_secs(5)).unwrap();

    let err = client.search("x", 1).await.unwrap_err();
    match err {
        PaperlensError::Upstream { status, message } => {
            assert_eq!(status, 503);
            assert!(message.contains("try later"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
