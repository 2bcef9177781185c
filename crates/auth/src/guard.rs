//! Boundary adapter: turns the root outcome into allow / reject.
//!
//! This is the only place a denial becomes an error. HTTP formatting of that
//! error is the host's job.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use permkit_core::{CheckOutcome, ResolveError};

use crate::dependency::Context;
use crate::permission::Permission;

/// Access-denied signal raised at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} ({status})")]
pub struct AccessDenied {
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("access denied: {0}")]
    Denied(AccessDenied),

    #[error("failed to resolve permission inputs: {0}")]
    Resolve(#[from] ResolveError),
}

/// Turn a root outcome into a boundary decision.
///
/// - `auto_raise` on: `Denied` raises, `Granted` and `Skipped` pass through
///   (an all-skipped expression lets the request proceed);
/// - `auto_raise` off: the outcome is always handed back.
pub fn decide<C: Context>(
    root: &Permission<C>,
    outcome: CheckOutcome,
) -> Result<CheckOutcome, AccessDenied> {
    match outcome {
        CheckOutcome::Denied { reason } if root.auto_raise() => Err(AccessDenied {
            status: root.status(),
            message: reason.unwrap_or_else(|| root.message()),
        }),
        outcome => Ok(outcome),
    }
}

/// Root permission registered on a route (or group of routes).
///
/// Immutable and cheap to clone; concurrent requests evaluate the same tree
/// without interfering.
pub struct Guard<C: Context> {
    root: Arc<Permission<C>>,
}

impl<C: Context> Clone for Guard<C> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
        }
    }
}

impl<C: Context> Guard<C> {
    pub fn new(root: Permission<C>) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    pub fn permission(&self) -> &Permission<C> {
        &self.root
    }

    pub fn auto_raise(&self) -> bool {
        self.root.auto_raise()
    }

    /// Evaluate the tree for one request and decide.
    pub async fn authorize(&self, ctx: &C) -> Result<CheckOutcome, GuardError> {
        let outcome = match self.root.evaluate(ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    permission = %self.root,
                    kind = %e.kind(),
                    slot = e.slot().unwrap_or("-"),
                    error = %e,
                    "permission inputs could not be resolved"
                );
                return Err(GuardError::Resolve(e));
            }
        };

        decide(&self.root, outcome).map_err(|denied| {
            tracing::warn!(
                permission = %self.root,
                status = denied.status,
                message = %denied.message,
                "access denied"
            );
            GuardError::Denied(denied)
        })
    }
}

impl<C: Context> From<Permission<C>> for Guard<C> {
    fn from(root: Permission<C>) -> Self {
        Self::new(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::Failing;
    use crate::testing::{Ctx, denied, granted, leaf, skipped};
    use permkit_core::ResolveErrorKind;

    #[test]
    fn decide_raises_only_denials() {
        let root = granted("a");
        assert_eq!(decide(&root, CheckOutcome::Granted), Ok(CheckOutcome::Granted));
        assert_eq!(
            decide(&root, CheckOutcome::skipped("no token")),
            Ok(CheckOutcome::skipped("no token"))
        );
        assert_eq!(
            decide(&root, CheckOutcome::denied_without_reason()),
            Err(AccessDenied {
                status: 403,
                message: "Permission denied".into(),
            })
        );
    }

    #[test]
    fn decide_hands_back_denials_without_auto_raise() {
        let root = granted("a").with_auto_raise(false);
        assert_eq!(
            decide(&root, CheckOutcome::denied("nope")),
            Ok(CheckOutcome::denied("nope"))
        );
    }

    #[tokio::test]
    async fn denial_uses_root_metadata() {
        let guard = Guard::new(
            (denied("a", "first") & granted("b"))
                .with_message("Members only")
                .with_status(401),
        );

        assert_eq!(
            guard.authorize(&Ctx).await,
            Err(GuardError::Denied(AccessDenied {
                status: 401,
                message: "Members only".into(),
            }))
        );
    }

    #[tokio::test]
    async fn all_skipped_lets_the_request_through() {
        let guard: Guard<Ctx> = (skipped("a") | skipped("b")).into();
        assert!(guard.authorize(&Ctx).await.unwrap().is_skipped());
    }

    #[tokio::test]
    async fn wrapped_root_reports_instead_of_raising() {
        let p = (granted("is_editor") | denied("is_author", "not the author"))
            .wrap()
            .with_auto_raise(false);
        let guard = Guard::new(p);
        assert!(!guard.auto_raise());
        assert_eq!(guard.authorize(&Ctx).await, Ok(CheckOutcome::Granted));

        let p = (!granted("is_banned")).wrap().with_auto_raise(false);
        let outcome = Guard::new(p).authorize(&Ctx).await.unwrap();
        assert!(outcome.is_denied());
    }

    #[tokio::test]
    async fn resolution_failures_surface_as_resolve_errors() {
        let p = Permission::new(
            crate::testing::Fixed::new("needs_id", Ok(CheckOutcome::Granted)).with_slot(
                Failing::new("id", ResolveError::validation("id must be an integer")).slot(),
            ),
        ) | leaf("other", CheckOutcome::Granted);

        match Guard::new(p).authorize(&Ctx).await {
            Err(GuardError::Resolve(e)) => {
                assert_eq!(e.kind(), ResolveErrorKind::Validation);
                assert_eq!(e.slot(), Some("id"));
            }
            other => panic!("expected a resolve error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn guard_is_shareable_across_tasks() {
        let guard = Guard::new(granted("a") & granted("b"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                tokio::spawn(async move { guard.authorize(&Ctx).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(CheckOutcome::Granted));
        }
    }
}
