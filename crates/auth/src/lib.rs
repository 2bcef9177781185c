//! `permkit-auth`: composable permission engine.
//!
//! Permissions are small check units combined with `&`, `|` and `!` into an
//! immutable tree at route-registration time, then evaluated per request into
//! a three-valued [`CheckOutcome`](permkit_core::CheckOutcome). A [`Guard`]
//! turns the root outcome into an allow/reject decision.
//!
//! This crate knows nothing about HTTP: the request context type
//! and the dependency slots are supplied by the host.

pub mod common;
pub mod dependency;
pub mod func;
pub mod guard;
pub mod lazy;
pub mod permission;
pub mod resolve;

#[cfg(test)]
mod testing;

pub use common::{HasRole, HasScope, IsAuthenticated};
pub use dependency::{Constant, Context, Dependency, Failing, Slot};
pub use func::{FuncPermission, permission_fn};
pub use guard::{AccessDenied, Guard, GuardError, decide};
pub use lazy::{LazyCheck, SkipOn, lazy};
pub use permission::{
    Check, DEFAULT_MESSAGE, DEFAULT_STATUS, IntoPermission, Kind, Leaf, Node, Permission,
    Settings, and_of, not_of, or_of,
};
pub use resolve::Resolved;

pub use permkit_core::{
    CheckError, CheckOutcome, CheckResult, CompositionError, Deps, ResolveError, ResolveErrorKind,
    fail, skip,
};
