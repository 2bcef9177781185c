//! Dependency slots: named, possibly-failing value resolution steps.
//!
//! The host framework owns *how* a value is produced (headers, path params,
//! a database lookup). The engine only needs to attempt a slot against the
//! per-request context and classify the failure.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use permkit_core::ResolveError;

/// Per-request context a permission tree is evaluated against.
///
/// Implemented for every `Send + Sync + 'static` type; the host picks one
/// (e.g. the HTTP request parts) and builds its permissions over it.
pub trait Context: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Context for T {}

/// A single dependency slot.
#[async_trait]
pub trait Dependency<C: Context>: Send + Sync {
    /// Name used in logs and attached to resolution errors.
    fn name(&self) -> &str;

    async fn resolve(&self, ctx: &C) -> Result<Value, ResolveError>;
}

/// Shared handle to a slot; leaves keep these for the lifetime of the tree.
pub type Slot<C> = Arc<dyn Dependency<C>>;

/// A slot that always resolves to the same value.
#[derive(Debug, Clone)]
pub struct Constant {
    name: Cow<'static, str>,
    value: Value,
}

impl Constant {
    pub fn new(name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn slot<C: Context>(self) -> Slot<C> {
        Arc::new(self)
    }
}

#[async_trait]
impl<C: Context> Dependency<C> for Constant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, _ctx: &C) -> Result<Value, ResolveError> {
        Ok(self.value.clone())
    }
}

/// A slot that always fails with the given error.
///
/// Handy for wiring a permission whose input is known to be unavailable in
/// some deployment, and for tests.
#[derive(Debug, Clone)]
pub struct Failing {
    name: Cow<'static, str>,
    error: ResolveError,
}

impl Failing {
    pub fn new(name: impl Into<Cow<'static, str>>, error: ResolveError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    pub fn slot<C: Context>(self) -> Slot<C> {
        Arc::new(self)
    }
}

#[async_trait]
impl<C: Context> Dependency<C> for Failing {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, _ctx: &C) -> Result<Value, ResolveError> {
        Err(self.error.clone())
    }
}
