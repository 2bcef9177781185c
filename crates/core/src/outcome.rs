//! Three-valued check outcome.

use serde::{Deserialize, Serialize};

/// Result of evaluating a permission (leaf or composite).
///
/// `Skipped` means the check was not meaningfully evaluated and is neutral in
/// composition. It is *not* the same as `Denied`, even though both are falsy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    Granted,
    Denied {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Skipped {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl CheckOutcome {
    pub fn granted() -> Self {
        Self::Granted
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: Some(reason.into()),
        }
    }

    pub fn denied_without_reason() -> Self {
        Self::Denied { reason: None }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: Some(reason.into()),
        }
    }

    pub fn skipped_without_reason() -> Self {
        Self::Skipped { reason: None }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Reason attached to a denial or skip, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Granted => None,
            Self::Denied { reason } | Self::Skipped { reason } => reason.as_deref(),
        }
    }

    /// Boolean view of the outcome: only `Granted` is truthy.
    ///
    /// Convenient for callers that don't care about skip vs. deny. Composition
    /// must match on the variant instead.
    pub fn as_bool(&self) -> bool {
        self.is_granted()
    }
}

impl From<bool> for CheckOutcome {
    fn from(value: bool) -> Self {
        if value {
            Self::Granted
        } else {
            Self::Denied { reason: None }
        }
    }
}

impl From<&CheckOutcome> for bool {
    fn from(value: &CheckOutcome) -> Self {
        value.as_bool()
    }
}

impl core::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Granted => f.write_str("granted"),
            Self::Denied { reason: None } => f.write_str("denied"),
            Self::Denied { reason: Some(r) } => write!(f, "denied ({r})"),
            Self::Skipped { reason: None } => f.write_str("skipped"),
            Self::Skipped { reason: Some(r) } => write!(f, "skipped ({r})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_is_sugar_for_granted_and_reasonless_denial() {
        assert_eq!(CheckOutcome::from(true), CheckOutcome::Granted);
        assert_eq!(CheckOutcome::from(false), CheckOutcome::Denied { reason: None });
    }

    #[test]
    fn only_granted_is_truthy() {
        assert!(CheckOutcome::granted().as_bool());
        assert!(!CheckOutcome::denied("nope").as_bool());
        assert!(!CheckOutcome::skipped("later").as_bool());
        assert!(!bool::from(&CheckOutcome::skipped_without_reason()));
    }

    #[test]
    fn type_tests_distinguish_skip_from_deny() {
        let skipped = CheckOutcome::skipped("no token");
        assert!(skipped.is_skipped());
        assert!(!skipped.is_denied());
        assert_eq!(skipped.reason(), Some("no token"));

        let denied = CheckOutcome::denied_without_reason();
        assert!(denied.is_denied());
        assert!(!denied.is_skipped());
        assert_eq!(denied.reason(), None);
    }

    #[test]
    fn serializes_with_outcome_tag() {
        let json = serde_json::to_value(CheckOutcome::denied("x")).unwrap();
        assert_eq!(json, serde_json::json!({ "outcome": "denied", "reason": "x" }));

        let json = serde_json::to_value(CheckOutcome::Granted).unwrap();
        assert_eq!(json, serde_json::json!({ "outcome": "granted" }));

        let back: CheckOutcome =
            serde_json::from_value(serde_json::json!({ "outcome": "skipped" })).unwrap();
        assert_eq!(back, CheckOutcome::skipped_without_reason());
    }
}
