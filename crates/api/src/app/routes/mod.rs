use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use permkit_core::CompositionError;

use crate::app::{policy, store::ArticleStore};
use crate::middleware::guard;

pub mod admin;
pub mod articles;
pub mod system;

/// Router for every permission-guarded endpoint.
///
/// Each group gets its own `route_layer`, so a permission only covers the
/// routes registered before it.
pub fn router(store: Arc<ArticleStore>) -> Result<Router, CompositionError> {
    let me = guard(
        Router::new().route("/me", get(system::me)),
        policy::signed_in(),
    );

    let moderation = guard(
        Router::new().route("/admin/moderation", get(admin::moderation_queue)),
        policy::admin_and_moderator(),
    );

    let read_articles = guard(
        Router::new()
            .route("/articles", get(articles::list_articles))
            .route("/articles/:article_id", get(articles::get_article)),
        policy::author_or_editor(Arc::clone(&store)),
    );

    let access = guard(
        Router::new().route("/articles/:article_id/access", get(articles::article_access)),
        policy::article_access(Arc::clone(&store)),
    );

    let report = guard(
        Router::new().route("/articles/:article_id/report", post(articles::report_article)),
        policy::not_own_article(Arc::clone(&store)),
    );

    let drafts = guard(
        Router::new().route("/drafts", get(articles::list_drafts)),
        policy::draft_reader(),
    );

    let search = guard(
        Router::new().route("/search", get(articles::search)),
        policy::within_page_limit()?,
    );

    Ok(Router::new()
        .merge(me)
        .merge(moderation)
        .merge(read_articles)
        .merge(access)
        .merge(report)
        .merge(drafts)
        .merge(search))
}
