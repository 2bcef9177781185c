//! Permissions guarding the demo routes.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;

use permkit_auth::{
    Check, CompositionError, HasRole, HasScope, Permission, ResolveErrorKind, Slot, lazy,
    permission_fn,
};
use permkit_core::{CheckOutcome, CheckResult, Deps, ResolveError, fail};

use crate::context::RequestContext;
use crate::deps::{FromFn, Header, ListHeader, QueryParam};
use crate::permissions::HasHeader;

use super::store::ArticleStore;

/// Upper bound accepted by the search endpoint's `limit`.
pub const MAX_PAGE_SIZE: u64 = 50;

fn article_id(ctx: &RequestContext) -> Result<u64, ResolveError> {
    let raw = ctx
        .path_param("article_id")
        .ok_or_else(|| ResolveError::validation("missing path parameter 'article_id'"))?;
    raw.parse()
        .map_err(|_| ResolveError::validation("article_id must be a positive integer"))
}

/// Author of the article addressed by the `article_id` path parameter.
pub fn article_author(store: Arc<ArticleStore>) -> Slot<RequestContext> {
    FromFn::new("article_author", move |ctx: &RequestContext| {
        let store = Arc::clone(&store);
        async move {
            let id = article_id(ctx)?;
            store
                .get(id)
                .map(|article| Value::from(article.author.clone()))
                .ok_or_else(|| ResolveError::not_found(format!("article {id} does not exist")))
        }
        .boxed()
    })
    .slot()
}

fn current_user() -> Slot<RequestContext> {
    Header::optional("x-user").slot()
}

fn current_role() -> Slot<RequestContext> {
    Header::new("x-role").with_default("guest").slot()
}

/// Grants when the caller (`x-user`) wrote the addressed article.
pub struct IsArticleAuthor {
    author: Slot<RequestContext>,
    user: Slot<RequestContext>,
}

impl IsArticleAuthor {
    pub fn new(store: Arc<ArticleStore>) -> Self {
        Self {
            author: article_author(store),
            user: current_user(),
        }
    }
}

#[async_trait]
impl Check<RequestContext> for IsArticleAuthor {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("is_article_author")
    }

    fn dependencies(&self) -> Vec<Slot<RequestContext>> {
        vec![Arc::clone(&self.author), Arc::clone(&self.user)]
    }

    async fn check(&self, _ctx: &RequestContext, deps: &Deps) -> CheckResult {
        let author: String = deps.get(0)?;
        let user: Option<String> = deps.get(1)?;
        Ok((user.as_deref() == Some(author.as_str())).into())
    }

    fn default_message(&self) -> Option<&'static str> {
        Some("Only the author may do this")
    }
}

pub fn is_editor() -> Permission<RequestContext> {
    Permission::new(HasRole::new(current_role(), ["editor"]))
}

/// `Authorization` header present.
pub fn signed_in() -> Permission<RequestContext> {
    Permission::new(HasHeader::new("authorization"))
}

/// Both leaves read the same `x-role` slot, resolved once per request.
pub fn admin_and_moderator() -> Permission<RequestContext> {
    let role = current_role();
    Permission::new(HasRole::new(Arc::clone(&role), ["admin"]))
        & Permission::new(HasRole::new(role, ["moderator"]))
}

/// Authors see their own article, editors see everything. On routes without
/// an `article_id` the author check is skipped and the editor check decides.
pub fn author_or_editor(store: Arc<ArticleStore>) -> Permission<RequestContext> {
    lazy(
        Permission::new(IsArticleAuthor::new(store)),
        ResolveErrorKind::Validation,
    ) | is_editor()
}

/// Reported, not enforced: unknown articles come back as skipped.
pub fn article_access(store: Arc<ArticleStore>) -> Permission<RequestContext> {
    lazy(
        Permission::new(IsArticleAuthor::new(store)),
        ResolveErrorKind::NotFound,
    )
    .named("article_access")
    .with_auto_raise(false)
}

pub fn not_own_article(store: Arc<ArticleStore>) -> Permission<RequestContext> {
    (!Permission::new(IsArticleAuthor::new(store)))
        .with_message("Authors cannot report their own articles")
        .with_status(409)
}

pub fn draft_reader() -> Permission<RequestContext> {
    Permission::new(HasScope::new(
        ListHeader::new("x-scopes", ',').slot(),
        ["articles:read", "drafts:read"],
    ))
}

pub fn within_page_limit() -> Result<Permission<RequestContext>, CompositionError> {
    permission_fn("within_page_limit", 1, |_ctx: &RequestContext, deps: &Deps| {
        async move {
            let raw: String = deps.get(0)?;
            let limit: u64 = raw
                .parse()
                .map_err(|_| ResolveError::validation("limit must be a positive integer"))?;

            if limit > MAX_PAGE_SIZE {
                fail(format!("limit must not exceed {MAX_PAGE_SIZE}"))
            } else {
                Ok(CheckOutcome::Granted)
            }
        }
        .boxed()
    })
    .with_status(400)
    .with(vec![QueryParam::new("limit").with_default("20").slot()])
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn context(uri: &str, headers: &[(&str, &str)], params: &[(&str, &str)]) -> RequestContext {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        RequestContext::new(parts, params.iter().copied())
    }

    fn store() -> Arc<ArticleStore> {
        Arc::new(ArticleStore::seeded())
    }

    #[tokio::test]
    async fn author_check_compares_user_and_author() {
        let p = Permission::new(IsArticleAuthor::new(store()));

        let ctx = context("/articles/1", &[("x-user", "alice")], &[("article_id", "1")]);
        assert_eq!(p.evaluate(&ctx).await.unwrap(), CheckOutcome::Granted);

        let ctx = context("/articles/1", &[("x-user", "bob")], &[("article_id", "1")]);
        assert_eq!(
            p.evaluate(&ctx).await.unwrap(),
            CheckOutcome::denied("Only the author may do this")
        );

        let ctx = context("/articles/9", &[], &[("article_id", "9")]);
        let err = p.evaluate(&ctx).await.unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::NotFound);
        assert_eq!(err.slot(), Some("article_author"));
    }

    #[tokio::test]
    async fn list_routes_fall_back_to_the_editor_check() {
        let p = author_or_editor(store());
        assert_eq!(p.to_string(), "(lazy(is_article_author) | has_role[editor])");

        let editor = context("/articles", &[("x-role", "editor")], &[]);
        assert_eq!(p.evaluate(&editor).await.unwrap(), CheckOutcome::Granted);

        let reader = context("/articles", &[("x-role", "reader")], &[]);
        assert!(p.evaluate(&reader).await.unwrap().is_denied());
    }

    #[tokio::test]
    async fn page_limit_is_enforced() {
        let p = within_page_limit().unwrap();

        let ctx = context("/search", &[], &[]);
        assert_eq!(p.evaluate(&ctx).await.unwrap(), CheckOutcome::Granted);

        let ctx = context("/search?limit=500", &[], &[]);
        assert_eq!(
            p.evaluate(&ctx).await.unwrap(),
            CheckOutcome::denied("limit must not exceed 50")
        );
        assert_eq!(p.status(), 400);

        let ctx = context("/search?limit=many", &[], &[]);
        let err = p.evaluate(&ctx).await.unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::Validation);
    }
}
