//! HTTP application wiring (Axum router + demo article catalogue).
//!
//! - `policy.rs`: the permission trees guarding each route group
//! - `routes/`: handlers (one file per area)
//! - `store.rs`: in-memory article fixtures
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use permkit_core::CompositionError;

pub mod errors;
pub mod policy;
pub mod routes;
pub mod store;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app() -> Result<Router, CompositionError> {
    build_app_with(Arc::new(store::ArticleStore::seeded()))
}

pub fn build_app_with(store: Arc<store::ArticleStore>) -> Result<Router, CompositionError> {
    let guarded = routes::router(Arc::clone(&store))?.layer(Extension(store));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(guarded))
}
