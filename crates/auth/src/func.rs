//! Permissions built from plain async functions.
//!
//! ```ignore
//! let has_role = permission_fn("has_role", 1, |_ctx: &RequestContext, deps: &Deps| {
//!     async move {
//!         let expected: String = deps.get(0)?;
//!         Ok((role_of(ctx) == expected).into())
//!     }
//!     .boxed()
//! });
//!
//! let admin_only = has_role.with(vec![Constant::new("admin_role", "admin").slot()])?;
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use permkit_core::{CheckResult, CompositionError, Deps};

use crate::dependency::{Context, Slot};
use crate::permission::{Check, Permission};

type CheckFn<C> = dyn for<'a> Fn(&'a C, &'a Deps) -> BoxFuture<'a, CheckResult> + Send + Sync;

/// Factory producing leaf permissions from one check function.
pub struct FuncPermission<C: Context> {
    name: Cow<'static, str>,
    slots: usize,
    func: Arc<CheckFn<C>>,
    message: Option<String>,
    status: Option<u16>,
}

/// Wrap `func` into a permission factory.
///
/// `slots` is the number of fixed dependency slots the function expects;
/// [`FuncPermission::with`] must receive exactly that many.
pub fn permission_fn<C, F>(name: impl Into<Cow<'static, str>>, slots: usize, func: F) -> FuncPermission<C>
where
    C: Context,
    F: for<'a> Fn(&'a C, &'a Deps) -> BoxFuture<'a, CheckResult> + Send + Sync + 'static,
{
    FuncPermission {
        name: name.into(),
        slots,
        func: Arc::new(func),
        message: None,
        status: None,
    }
}

impl<C: Context> FuncPermission<C> {
    /// Message for every permission this factory produces.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Status for every permission this factory produces.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Build a permission, binding `deps` to the function's leading slots.
    pub fn with(&self, deps: Vec<Slot<C>>) -> Result<Permission<C>, CompositionError> {
        if deps.len() != self.slots {
            return Err(CompositionError::SlotCountMismatch {
                name: self.name.to_string(),
                expected: self.slots,
                given: deps.len(),
            });
        }

        Ok(Permission::new(FuncCheck {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
            deps,
            message: self.message.clone(),
            status: self.status,
        }))
    }

    /// Build a permission for a function without slots.
    pub fn call(&self) -> Result<Permission<C>, CompositionError> {
        self.with(Vec::new())
    }
}

struct FuncCheck<C: Context> {
    name: Cow<'static, str>,
    func: Arc<CheckFn<C>>,
    deps: Vec<Slot<C>>,
    message: Option<String>,
    status: Option<u16>,
}

#[async_trait]
impl<C: Context> Check<C> for FuncCheck<C> {
    fn name(&self) -> Cow<'static, str> {
        self.name.clone()
    }

    fn dependencies(&self) -> Vec<Slot<C>> {
        self.deps.clone()
    }

    async fn check(&self, ctx: &C, deps: &Deps) -> CheckResult {
        (self.func)(ctx, deps).await
    }

    fn message(&self) -> Option<String> {
        self.message.clone()
    }

    fn status(&self) -> Option<u16> {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use permkit_core::{CheckOutcome, ResolveErrorKind, fail};

    use super::*;
    use crate::dependency::{Constant, Failing};
    use crate::testing::Ctx;
    use permkit_core::ResolveError;

    fn older_than() -> FuncPermission<Ctx> {
        permission_fn("older_than", 2, |_ctx: &Ctx, deps: &Deps| {
            async move {
                let age: u32 = deps.get(0)?;
                let min: u32 = deps.get(1)?;
                if age > min {
                    Ok(CheckOutcome::Granted)
                } else {
                    fail(format!("must be older than {min}"))
                }
            }
            .boxed()
        })
    }

    fn ages(age: u32, min: u32) -> Vec<Slot<Ctx>> {
        vec![
            Constant::new("age", age).slot(),
            Constant::new("min_age", min).slot(),
        ]
    }

    #[test]
    fn slot_count_is_checked_when_binding() {
        let err = older_than().with(ages(30, 18).into_iter().take(1).collect()).unwrap_err();
        assert_eq!(
            err,
            CompositionError::SlotCountMismatch {
                name: "older_than".into(),
                expected: 2,
                given: 1,
            }
        );
        assert!(err.to_string().contains("declares 2 dependency slot(s) but 1 were given"));
    }

    #[tokio::test]
    async fn bound_slots_reach_the_function() {
        let factory = older_than();

        let p = factory.with(ages(30, 18)).unwrap();
        assert_eq!(p.to_string(), "older_than");
        assert_eq!(p.evaluate(&Ctx).await.unwrap(), CheckOutcome::Granted);

        let p = factory.with(ages(16, 18)).unwrap();
        assert_eq!(
            p.evaluate(&Ctx).await.unwrap(),
            CheckOutcome::denied("must be older than 18")
        );
    }

    #[tokio::test]
    async fn factory_metadata_applies_to_every_instance() {
        let deny = permission_fn("never", 0, |_ctx: &Ctx, _deps: &Deps| {
            async { Ok(CheckOutcome::denied_without_reason()) }.boxed()
        })
        .with_message("Nobody gets in")
        .with_status(451);

        let p = deny.call().unwrap();
        assert_eq!(p.message(), "Nobody gets in");
        assert_eq!(p.status(), 451);
        assert_eq!(
            p.evaluate(&Ctx).await.unwrap(),
            CheckOutcome::denied("Nobody gets in")
        );

        let overridden = deny.call().unwrap().with_message("Go away");
        assert_eq!(
            overridden.evaluate(&Ctx).await.unwrap(),
            CheckOutcome::denied("Go away")
        );
    }

    #[tokio::test]
    async fn slot_failures_carry_the_slot_name() {
        let p = older_than()
            .with(vec![
                Failing::new("age", ResolveError::validation("age is required")).slot(),
                Constant::new("min_age", 18).slot(),
            ])
            .unwrap();

        let err = p.evaluate(&Ctx).await.unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::Validation);
        assert_eq!(err.slot(), Some("age"));
    }

    #[test]
    fn call_requires_a_slotless_function() {
        let err = older_than().call().unwrap_err();
        assert!(matches!(err, CompositionError::SlotCountMismatch { given: 0, .. }));
    }
}
