//! Ready-made permissions over a single dependency slot.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

use permkit_core::{CheckResult, Deps};

use crate::dependency::{Context, Slot};
use crate::permission::Check;

/// Grants when the slot resolves to `true`.
pub struct IsAuthenticated<C: Context> {
    authenticated: Slot<C>,
}

impl<C: Context> IsAuthenticated<C> {
    pub fn new(authenticated: Slot<C>) -> Self {
        Self { authenticated }
    }
}

#[async_trait]
impl<C: Context> Check<C> for IsAuthenticated<C> {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("is_authenticated")
    }

    fn dependencies(&self) -> Vec<Slot<C>> {
        vec![Arc::clone(&self.authenticated)]
    }

    async fn check(&self, _ctx: &C, deps: &Deps) -> CheckResult {
        let authenticated: bool = deps.get(0)?;
        Ok(authenticated.into())
    }
}

/// Grants when every required scope is among the caller's scopes.
pub struct HasScope<C: Context> {
    current: Slot<C>,
    scopes: Vec<String>,
}

impl<C: Context> HasScope<C> {
    pub fn new<I, S>(current: Slot<C>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            current,
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Required scopes, for security metadata.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

#[async_trait]
impl<C: Context> Check<C> for HasScope<C> {
    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("has_scope[{}]", self.scopes.join(",")))
    }

    fn dependencies(&self) -> Vec<Slot<C>> {
        vec![Arc::clone(&self.current)]
    }

    async fn check(&self, _ctx: &C, deps: &Deps) -> CheckResult {
        let current: Vec<String> = deps.get(0)?;
        let granted = self
            .scopes
            .iter()
            .all(|required| current.iter().any(|s| s == required));
        Ok(granted.into())
    }
}

/// Grants when the caller's role is one of `roles`.
pub struct HasRole<C: Context> {
    current: Slot<C>,
    roles: Vec<String>,
}

impl<C: Context> HasRole<C> {
    pub fn new<I, S>(current: Slot<C>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            current,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}

#[async_trait]
impl<C: Context> Check<C> for HasRole<C> {
    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("has_role[{}]", self.roles.join(",")))
    }

    fn dependencies(&self) -> Vec<Slot<C>> {
        vec![Arc::clone(&self.current)]
    }

    async fn check(&self, _ctx: &C, deps: &Deps) -> CheckResult {
        let current: String = deps.get(0)?;
        Ok(self.roles.contains(&current).into())
    }
}
