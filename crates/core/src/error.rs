//! Error taxonomy for permission checks.
//!
//! - explicit deny / explicit skip are *signals*, converted to outcomes by the
//!   leaf that raised them and never visible past it;
//! - resolution failures are genuine errors, fatal unless a lazy node lists
//!   their kind;
//! - composition errors are raised at construction time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CheckOutcome;

/// Result type returned by a single check.
pub type CheckResult = Result<CheckOutcome, CheckError>;

/// Classification of a dependency resolution failure.
///
/// Lazy permissions match on this to decide whether a failure downgrades to
/// a skip.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveErrorKind {
    /// The request did not carry a usable value (missing or malformed input).
    Validation,
    /// The value refers to something that does not exist.
    NotFound,
    /// No authenticated identity was available.
    Unauthenticated,
    /// Anything else (backend failure, bug in a resolver).
    Other,
}

impl core::fmt::Display for ResolveErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Unauthenticated => "unauthenticated",
            Self::Other => "other",
        })
    }
}

/// A dependency slot failed to produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ResolveError {
    kind: ResolveErrorKind,
    slot: Option<String>,
    message: String,
}

impl ResolveError {
    pub fn new(kind: ResolveErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            slot: None,
            message: message.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ResolveErrorKind::Validation, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ResolveErrorKind::NotFound, msg)
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::new(ResolveErrorKind::Unauthenticated, msg)
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::new(ResolveErrorKind::Other, msg)
    }

    /// Attach the name of the slot that failed (first one wins).
    pub fn for_slot(mut self, slot: impl Into<String>) -> Self {
        if self.slot.is_none() {
            self.slot = Some(slot.into());
        }
        self
    }

    pub fn kind(&self) -> ResolveErrorKind {
        self.kind
    }

    pub fn slot(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Early exit from a check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// Explicit denial, optionally with a reason overriding default messages.
    #[error("permission check failed")]
    Fail(Option<String>),

    /// Explicit skip: the check does not apply to this request.
    #[error("permission check skipped")]
    Skip(Option<String>),

    /// A value the check needed could not be produced.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Deny from inside a check: `return fail("not the owner");`
pub fn fail<T>(reason: impl Into<String>) -> Result<T, CheckError> {
    Err(CheckError::Fail(Some(reason.into())))
}

/// Skip from inside a check: `return skip("no token provided");`
pub fn skip<T>(reason: impl Into<String>) -> Result<T, CheckError> {
    Err(CheckError::Skip(Some(reason.into())))
}

/// Construction-time well-formedness error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("permission '{name}' declares {expected} dependency slot(s) but {given} were given")]
    SlotCountMismatch {
        name: String,
        expected: usize,
        given: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_and_skip_carry_reasons() {
        let err = fail::<()>("not the owner").unwrap_err();
        assert_eq!(err, CheckError::Fail(Some("not the owner".into())));

        let err = skip::<()>("no token").unwrap_err();
        assert_eq!(err, CheckError::Skip(Some("no token".into())));
    }

    #[test]
    fn resolve_error_keeps_first_slot_name() {
        let err = ResolveError::validation("header 'age' is missing")
            .for_slot("age")
            .for_slot("outer");

        assert_eq!(err.kind(), ResolveErrorKind::Validation);
        assert_eq!(err.slot(), Some("age"));
        assert_eq!(err.to_string(), "header 'age' is missing");
    }

    #[test]
    fn resolve_error_converts_into_check_error() {
        let err: CheckError = ResolveError::not_found("article 7").into();
        let CheckError::Resolve(inner) = err else {
            panic!("expected resolve error");
        };
        assert_eq!(inner.kind(), ResolveErrorKind::NotFound);
    }

    #[test]
    fn slot_count_mismatch_message() {
        let err = CompositionError::SlotCountMismatch {
            name: "has_role".into(),
            expected: 1,
            given: 2,
        };
        assert_eq!(
            err.to_string(),
            "permission 'has_role' declares 1 dependency slot(s) but 2 were given"
        );
    }
}
