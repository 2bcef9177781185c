//! Resolution and evaluation engine.
//!
//! Evaluation runs in two phases:
//!
//! 1. [`Permission::resolve`] attempts every declared slot of every non-lazy
//!    node. Any failure here is fatal, even when a sibling would have
//!    granted. Lazy nodes resolve nothing yet.
//! 2. [`Resolved::evaluate`] runs the checks and combines outcomes bottom-up,
//!    in declared child order. Only this step short-circuits.
//!
//! Each slot is resolved at most once per pass: leaves sharing a slot, and
//! lazy subtrees resolved later, reuse the first result (success or failure).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared, try_join_all};
use serde_json::Value;

use permkit_core::{CheckError, CheckOutcome, Deps, ResolveError};

use crate::dependency::{Context, Slot};
use crate::lazy::SkipOn;
use crate::permission::{Node, Permission};

type SlotFuture<'a> = Shared<BoxFuture<'a, Result<Value, ResolveError>>>;

/// Slot results for one evaluation pass, keyed by slot identity.
#[derive(Default)]
pub(crate) struct SlotCache<'a> {
    resolved: Mutex<HashMap<usize, SlotFuture<'a>>>,
}

impl<'a> SlotCache<'a> {
    fn resolve<C: Context>(&self, slot: &'a Slot<C>, ctx: &'a C) -> SlotFuture<'a> {
        let key = Arc::as_ptr(slot).cast::<()>() as usize;
        let mut resolved = self.resolved.lock().unwrap_or_else(PoisonError::into_inner);

        resolved
            .entry(key)
            .or_insert_with(|| {
                async move {
                    tracing::trace!(slot = slot.name(), "resolving dependency slot");
                    slot.resolve(ctx)
                        .await
                        .map_err(|e| e.for_slot(slot.name().to_owned()))
                }
                .boxed()
                .shared()
            })
            .clone()
    }
}

/// A permission tree whose eager inputs have been resolved for one request.
pub struct Resolved<'a, C: Context> {
    permission: &'a Permission<C>,
    ctx: &'a C,
    cache: Arc<SlotCache<'a>>,
    state: State<'a, C>,
}

enum State<'a, C: Context> {
    Leaf(Deps),
    Children(Vec<Resolved<'a, C>>),
    Inner(Box<Resolved<'a, C>>),
    Deferred {
        inner: &'a Permission<C>,
        skip_on: &'a SkipOn,
    },
}

impl<C: Context> Permission<C> {
    /// Phase 1: resolve eager inputs for `ctx`.
    pub fn resolve<'a>(&'a self, ctx: &'a C) -> BoxFuture<'a, Result<Resolved<'a, C>, ResolveError>> {
        self.resolve_in(ctx, Arc::default())
    }

    fn resolve_in<'a>(
        &'a self,
        ctx: &'a C,
        cache: Arc<SlotCache<'a>>,
    ) -> BoxFuture<'a, Result<Resolved<'a, C>, ResolveError>> {
        async move {
            let state = match &self.node {
                Node::Leaf(leaf) => {
                    let values =
                        try_join_all(leaf.slots.iter().map(|slot| cache.resolve(slot, ctx))).await?;
                    State::Leaf(Deps::new(values))
                }
                Node::All(children) | Node::Any(children) => State::Children(
                    try_join_all(children.iter().map(|c| c.resolve_in(ctx, Arc::clone(&cache))))
                        .await?,
                ),
                Node::Not(inner) | Node::Wrapper { inner, .. } => {
                    State::Inner(Box::new(inner.resolve_in(ctx, Arc::clone(&cache)).await?))
                }
                Node::Lazy { inner, skip_on } => State::Deferred {
                    inner: inner.as_ref(),
                    skip_on,
                },
            };

            Ok(Resolved {
                permission: self,
                ctx,
                cache,
                state,
            })
        }
        .boxed()
    }

    /// Resolve and evaluate in one go.
    ///
    /// The only error that escapes is a resolution failure no lazy node
    /// absorbed; it is returned unchanged.
    pub async fn evaluate(&self, ctx: &C) -> Result<CheckOutcome, ResolveError> {
        self.resolve(ctx).await?.evaluate().await
    }
}

impl<'a, C: Context> Resolved<'a, C> {
    pub fn permission(&self) -> &'a Permission<C> {
        self.permission
    }

    /// Phase 2: run checks and combine outcomes.
    pub fn evaluate(&self) -> BoxFuture<'_, Result<CheckOutcome, ResolveError>> {
        async move {
            let outcome = match (&self.permission.node, &self.state) {
                (Node::Leaf(leaf), State::Leaf(deps)) => {
                    match leaf.check.check(self.ctx, deps).await {
                        Ok(outcome) => outcome,
                        Err(CheckError::Fail(reason)) => CheckOutcome::Denied { reason },
                        Err(CheckError::Skip(reason)) => CheckOutcome::Skipped { reason },
                        Err(CheckError::Resolve(e)) => return Err(e),
                    }
                }
                (Node::All(_), State::Children(children)) => all(children).await?,
                (Node::Any(_), State::Children(children)) => any(children).await?,
                (Node::Not(_), State::Inner(inner)) => match inner.evaluate().await? {
                    CheckOutcome::Granted => CheckOutcome::Denied { reason: None },
                    CheckOutcome::Denied { .. } => CheckOutcome::Granted,
                    skipped @ CheckOutcome::Skipped { .. } => skipped,
                },
                (Node::Wrapper { .. }, State::Inner(inner)) => inner.evaluate().await?,
                (Node::Lazy { .. }, State::Deferred { inner, skip_on }) => {
                    deferred(*inner, skip_on, self.ctx, Arc::clone(&self.cache)).await?
                }
                _ => {
                    return Err(ResolveError::other(format!(
                        "resolved state does not match permission '{}'",
                        self.permission
                    )));
                }
            };

            let outcome = self.permission.finish(outcome);
            tracing::debug!(
                permission = %self.permission,
                outcome = %outcome,
                "permission evaluated"
            );
            Ok(outcome)
        }
        .boxed()
    }
}

// AND: first denial wins; any grant beats skips; all skipped stays skipped.
async fn all<C: Context>(children: &[Resolved<'_, C>]) -> Result<CheckOutcome, ResolveError> {
    let mut granted = false;
    let mut first_skip = None;

    for child in children {
        match child.evaluate().await? {
            denied @ CheckOutcome::Denied { .. } => return Ok(denied),
            CheckOutcome::Granted => granted = true,
            CheckOutcome::Skipped { reason } => {
                first_skip.get_or_insert(reason);
            }
        }
    }

    if granted {
        Ok(CheckOutcome::Granted)
    } else {
        Ok(CheckOutcome::Skipped {
            reason: first_skip.flatten(),
        })
    }
}

// OR: first grant wins; otherwise the last denial; skips only if nothing else.
async fn any<C: Context>(children: &[Resolved<'_, C>]) -> Result<CheckOutcome, ResolveError> {
    let mut last_denied = None;
    let mut first_skip = None;

    for child in children {
        match child.evaluate().await? {
            CheckOutcome::Granted => return Ok(CheckOutcome::Granted),
            denied @ CheckOutcome::Denied { .. } => last_denied = Some(denied),
            CheckOutcome::Skipped { reason } => {
                first_skip.get_or_insert(reason);
            }
        }
    }

    Ok(last_denied.unwrap_or(CheckOutcome::Skipped {
        reason: first_skip.flatten(),
    }))
}

async fn deferred<'a, C: Context>(
    inner: &'a Permission<C>,
    skip_on: &SkipOn,
    ctx: &'a C,
    cache: Arc<SlotCache<'a>>,
) -> Result<CheckOutcome, ResolveError> {
    let result = match inner.resolve_in(ctx, cache).await {
        Ok(resolved) => resolved.evaluate().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => Ok(outcome),
        Err(e) if skip_on.contains(e.kind()) => {
            tracing::debug!(
                permission = %inner,
                kind = %e.kind(),
                slot = e.slot().unwrap_or("-"),
                error = %e,
                "lazy permission skipped"
            );
            Ok(CheckOutcome::Skipped {
                reason: Some(e.to_string()),
            })
        }
        Err(e) => Err(e),
    }
}
