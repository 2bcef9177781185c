//! HTTP integration for permkit: request context, request-backed dependency
//! slots, the guard middleware, and a demo application.

pub mod app;
pub mod config;
pub mod context;
pub mod deps;
pub mod middleware;
pub mod permissions;

pub use context::RequestContext;
pub use middleware::{GuardState, guard, guard_middleware};
