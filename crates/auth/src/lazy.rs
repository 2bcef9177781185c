//! Lazy permissions: defer input resolution to evaluation time and turn
//! selected resolution failures into a skip.
//!
//! Three ways to get the same node:
//!
//! ```ignore
//! // wrap an instance
//! let p = lazy(Permission::new(IsArticleAuthor::new(article_id)), ResolveErrorKind::Validation);
//!
//! // per-type configuration: `Check::skip_on` returns `Some(..)`
//! let p = Permission::new(LazyArticleAuthor::new(article_id));
//!
//! // decorate a check type
//! let p = Permission::new(LazyCheck::new(IsArticleAuthor::new(article_id)).with_skip_on(ResolveErrorKind::Validation));
//! ```

use std::borrow::Cow;

use async_trait::async_trait;

use permkit_core::{CheckResult, Deps, ResolveErrorKind};

use crate::dependency::{Context, Slot};
use crate::permission::{Check, Node, Permission};

/// Allow-list of resolution failure kinds a lazy node downgrades to a skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipOn {
    kinds: Vec<ResolveErrorKind>,
}

impl SkipOn {
    pub fn new(kinds: impl IntoIterator<Item = ResolveErrorKind>) -> Self {
        let mut out = Vec::new();
        for kind in kinds {
            if !out.contains(&kind) {
                out.push(kind);
            }
        }
        Self { kinds: out }
    }

    /// Empty allow-list: resolution is still deferred, nothing is absorbed.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, kind: ResolveErrorKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn kinds(&self) -> &[ResolveErrorKind] {
        &self.kinds
    }
}

impl From<ResolveErrorKind> for SkipOn {
    fn from(kind: ResolveErrorKind) -> Self {
        Self::new([kind])
    }
}

impl<const N: usize> From<[ResolveErrorKind; N]> for SkipOn {
    fn from(kinds: [ResolveErrorKind; N]) -> Self {
        Self::new(kinds)
    }
}

impl From<Vec<ResolveErrorKind>> for SkipOn {
    fn from(kinds: Vec<ResolveErrorKind>) -> Self {
        Self::new(kinds)
    }
}

impl<C: Context> Permission<C> {
    /// Wrap this permission in a lazy node.
    pub fn lazy(self, skip_on: impl Into<SkipOn>) -> Self {
        Self::from_node(Node::Lazy {
            inner: Box::new(self),
            skip_on: skip_on.into(),
        })
    }
}

/// Wrap `permission` in a lazy node that skips on the listed failure kinds.
pub fn lazy<C: Context>(permission: Permission<C>, skip_on: impl Into<SkipOn>) -> Permission<C> {
    permission.lazy(skip_on)
}

/// Decorator turning any check into a lazily resolved one.
///
/// Without [`LazyCheck::with_skip_on`] the wrapped check's own
/// [`Check::skip_on`] is used, falling back to an empty allow-list.
#[derive(Debug, Clone)]
pub struct LazyCheck<T> {
    inner: T,
    skip_on: Option<SkipOn>,
}

impl<T> LazyCheck<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            skip_on: None,
        }
    }

    pub fn with_skip_on(mut self, skip_on: impl Into<SkipOn>) -> Self {
        self.skip_on = Some(skip_on.into());
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<C: Context, T: Check<C>> Check<C> for LazyCheck<T> {
    fn name(&self) -> Cow<'static, str> {
        self.inner.name()
    }

    fn dependencies(&self) -> Vec<Slot<C>> {
        self.inner.dependencies()
    }

    async fn check(&self, ctx: &C, deps: &Deps) -> CheckResult {
        self.inner.check(ctx, deps).await
    }

    fn message(&self) -> Option<String> {
        self.inner.message()
    }

    fn default_message(&self) -> Option<&'static str> {
        self.inner.default_message()
    }

    fn status(&self) -> Option<u16> {
        self.inner.status()
    }

    fn default_status(&self) -> Option<u16> {
        self.inner.default_status()
    }

    fn skip_on(&self) -> Option<SkipOn> {
        Some(
            self.skip_on
                .clone()
                .or_else(|| self.inner.skip_on())
                .unwrap_or_default(),
        )
    }
}
