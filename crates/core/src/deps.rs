//! Resolved dependency values handed to a check.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ResolveError;

/// Values produced by a permission's declared dependency slots, in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deps {
    values: Vec<Value>,
}

impl Deps {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value of slot `idx`.
    pub fn value(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Typed value of slot `idx`.
    ///
    /// A value of the wrong shape is a validation error, the same
    /// classification the host uses for malformed request input. Reading an
    /// index the check never declared is a bug in the check and fails with
    /// [`ResolveErrorKind::Other`](crate::ResolveErrorKind::Other), which no
    /// lazy allow-list is expected to absorb.
    pub fn get<T: DeserializeOwned>(&self, idx: usize) -> Result<T, ResolveError> {
        let value = self.values.get(idx).ok_or_else(|| {
            ResolveError::other(format!(
                "dependency slot {idx} is not declared ({} declared)",
                self.values.len()
            ))
        })?;

        T::deserialize(value).map_err(|e| {
            ResolveError::validation(format!("dependency slot {idx} has an unexpected shape: {e}"))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}

impl From<Vec<Value>> for Deps {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}
