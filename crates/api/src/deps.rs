//! Dependency slots reading from the HTTP request.
//!
//! Missing or malformed inputs fail with [`ResolveError::validation`], which
//! the guard middleware reports as `422 Unprocessable Entity` unless a lazy
//! permission absorbs it.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use permkit_auth::{Dependency, Slot};
use permkit_core::ResolveError;

use crate::context::RequestContext;

/// A single request header as a string.
#[derive(Debug, Clone)]
pub struct Header {
    name: Cow<'static, str>,
    default: Option<Value>,
}

impl Header {
    /// Required header; absent means a validation failure.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// Header that resolves to `null` when absent.
    pub fn optional(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name).with_default(Value::Null)
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn slot(self) -> Slot<RequestContext> {
        Arc::new(self)
    }
}

#[async_trait]
impl Dependency<RequestContext> for Header {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, ctx: &RequestContext) -> Result<Value, ResolveError> {
        match (ctx.header(&self.name)?, &self.default) {
            (Some(value), _) => Ok(Value::from(value)),
            (None, Some(default)) => Ok(default.clone()),
            (None, None) => Err(ResolveError::validation(format!(
                "missing header '{}'",
                self.name
            ))),
        }
    }
}

/// A header holding a separated list, e.g. `x-scopes: a,b,c`.
///
/// Resolves to a JSON array of trimmed, non-empty items; an absent header is
/// an empty list.
#[derive(Debug, Clone)]
pub struct ListHeader {
    name: Cow<'static, str>,
    separator: char,
}

impl ListHeader {
    pub fn new(name: impl Into<Cow<'static, str>>, separator: char) -> Self {
        Self {
            name: name.into(),
            separator,
        }
    }

    pub fn slot(self) -> Slot<RequestContext> {
        Arc::new(self)
    }
}

#[async_trait]
impl Dependency<RequestContext> for ListHeader {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, ctx: &RequestContext) -> Result<Value, ResolveError> {
        let items: Vec<Value> = ctx
            .header(&self.name)?
            .map(|raw| {
                raw.split(self.separator)
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(Value::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Value::Array(items))
    }
}

/// A matched path parameter as a string.
#[derive(Debug, Clone)]
pub struct PathParam {
    name: Cow<'static, str>,
}

impl PathParam {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn slot(self) -> Slot<RequestContext> {
        Arc::new(self)
    }
}

#[async_trait]
impl Dependency<RequestContext> for PathParam {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, ctx: &RequestContext) -> Result<Value, ResolveError> {
        ctx.path_param(&self.name).map(Value::from).ok_or_else(|| {
            ResolveError::validation(format!("missing path parameter '{}'", self.name))
        })
    }
}

/// A query string parameter as a string.
#[derive(Debug, Clone)]
pub struct QueryParam {
    name: Cow<'static, str>,
    default: Option<Value>,
}

impl QueryParam {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn slot(self) -> Slot<RequestContext> {
        Arc::new(self)
    }
}

#[async_trait]
impl Dependency<RequestContext> for QueryParam {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, ctx: &RequestContext) -> Result<Value, ResolveError> {
        match (ctx.query_param(&self.name)?, &self.default) {
            (Some(value), _) => Ok(Value::from(value)),
            (None, Some(default)) => Ok(default.clone()),
            (None, None) => Err(ResolveError::validation(format!(
                "missing query parameter '{}'",
                self.name
            ))),
        }
    }
}

type ResolveFn = dyn for<'a> Fn(&'a RequestContext) -> BoxFuture<'a, Result<Value, ResolveError>>
    + Send
    + Sync;

/// Slot backed by an async function, for lookups (database, other services).
#[derive(Clone)]
pub struct FromFn {
    name: Cow<'static, str>,
    func: Arc<ResolveFn>,
}

impl FromFn {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: for<'a> Fn(&'a RequestContext) -> BoxFuture<'a, Result<Value, ResolveError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn slot(self) -> Slot<RequestContext> {
        Arc::new(self)
    }
}

impl std::fmt::Debug for FromFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromFn").field("name", &self.name).finish()
    }
}

#[async_trait]
impl Dependency<RequestContext> for FromFn {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, ctx: &RequestContext) -> Result<Value, ResolveError> {
        (self.func)(ctx).await
    }
}
