//! Axum router — maps all URL paths to handlers.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    system::{root, health},
    search::search_papers,
    papers::{papers_by_topic, paper_by_id, list_topics, clear_topic},
    qa::answer_question,
    future_works::generate_future_works,
    pages::{home_page, search_page, qa_page, future_works_page},
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // API endpoints
        .route("/",                       get(root))
        .route("/health",                 get(health))
        .route("/search",                 post(search_papers))
        .route("/papers/{topic}",         get(papers_by_topic))
        .route("/paper/{paper_id}",       get(paper_by_id))
        .route("/topics",                 get(list_topics))
        .route("/topics/{topic}",         delete(clear_topic))
        .route("/qa",                     post(answer_question))
        .route("/generate-future-works",  post(generate_future_works))

        // Pages
        .route("/ui",                 get(home_page))
        .route("/ui/search",          get(search_page))
        .route("/ui/qa",              get(qa_page))
        .route("/ui/future-works",    get(future_works_page))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
