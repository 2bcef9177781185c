//! Article endpoints.
//!
//! Permissions are enforced by the guard layer in `routes::router`; handlers
//! only deal with the happy path (and read the outcome where it is reported
//! rather than enforced).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use permkit_core::CheckOutcome;

use crate::app::{errors, store::ArticleStore};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u64>,
}

/// GET /articles
pub async fn list_articles(Extension(store): Extension<Arc<ArticleStore>>) -> impl IntoResponse {
    Json(serde_json::json!({ "articles": store.list() }))
}

/// GET /articles/:article_id
pub async fn get_article(
    Extension(store): Extension<Arc<ArticleStore>>,
    Path(article_id): Path<u64>,
) -> axum::response::Response {
    match store.get(article_id) {
        Some(article) => (StatusCode::OK, Json(article.clone())).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "article not found"),
    }
}

/// GET /articles/:article_id/access - reports the raw outcome, never rejects
pub async fn article_access(
    Path(article_id): Path<String>,
    Extension(outcome): Extension<CheckOutcome>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "article_id": article_id,
        "access": outcome,
    }))
}

/// POST /articles/:article_id/report
pub async fn report_article(Path(article_id): Path<u64>) -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "reported": article_id })),
    )
}

/// GET /drafts
pub async fn list_drafts() -> impl IntoResponse {
    Json(serde_json::json!({ "drafts": [] }))
}

/// GET /search
pub async fn search(
    Extension(store): Extension<Arc<ArticleStore>>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let needle = query.q.unwrap_or_default().to_lowercase();
    let limit = query.limit.unwrap_or(20) as usize;

    let hits: Vec<_> = store
        .list()
        .into_iter()
        .filter(|a| a.title.to_lowercase().contains(&needle))
        .take(limit)
        .collect();

    Json(serde_json::json!({ "articles": hits }))
}
