//! Test fixtures shared by the unit test modules.

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use permkit_core::{CheckError, CheckOutcome, CheckResult, Deps, ResolveError};

use crate::dependency::{Dependency, Slot};
use crate::permission::{Check, Permission};

/// Unit request context; fixtures carry everything they need.
#[derive(Debug, Default)]
pub(crate) struct Ctx;

/// Check returning a fixed result and counting its invocations.
pub(crate) struct Fixed {
    name: &'static str,
    result: CheckResult,
    slots: Vec<Slot<Ctx>>,
    calls: Arc<AtomicUsize>,
}

impl Fixed {
    pub(crate) fn new(name: &'static str, result: CheckResult) -> Self {
        Self {
            name,
            result,
            slots: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_slot(mut self, slot: Slot<Ctx>) -> Self {
        self.slots.push(slot);
        self
    }

    pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Check<Ctx> for Fixed {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.name)
    }

    fn dependencies(&self) -> Vec<Slot<Ctx>> {
        self.slots.clone()
    }

    async fn check(&self, _ctx: &Ctx, _deps: &Deps) -> CheckResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Slot resolving to a fixed value and counting its resolutions.
pub(crate) struct Counting {
    name: &'static str,
    value: Value,
    calls: Arc<AtomicUsize>,
}

impl Counting {
    pub(crate) fn slot(name: &'static str, value: impl Into<Value>) -> (Slot<Ctx>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let slot = Arc::new(Self {
            name,
            value: value.into(),
            calls: Arc::clone(&calls),
        });
        (slot, calls)
    }
}

#[async_trait]
impl Dependency<Ctx> for Counting {
    fn name(&self) -> &str {
        self.name
    }

    async fn resolve(&self, _ctx: &Ctx) -> Result<Value, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }
}

pub(crate) fn leaf(name: &'static str, outcome: CheckOutcome) -> Permission<Ctx> {
    Permission::new(Fixed::new(name, Ok(outcome)))
}

pub(crate) fn granted(name: &'static str) -> Permission<Ctx> {
    leaf(name, CheckOutcome::Granted)
}

pub(crate) fn denied(name: &'static str, reason: &str) -> Permission<Ctx> {
    leaf(name, CheckOutcome::denied(reason))
}

pub(crate) fn skipped(name: &'static str) -> Permission<Ctx> {
    leaf(name, CheckOutcome::skipped_without_reason())
}

pub(crate) fn signal(name: &'static str, err: CheckError) -> Permission<Ctx> {
    Permission::new(Fixed::new(name, Err(err)))
}

/// Leaf plus a handle on its call counter.
pub(crate) fn counted(name: &'static str, outcome: CheckOutcome) -> (Permission<Ctx>, Arc<AtomicUsize>) {
    let check = Fixed::new(name, Ok(outcome));
    let calls = check.calls();
    (Permission::new(check), calls)
}

pub(crate) fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
