use axum::{
    Router,
    extract::{RawPathParams, Request, State},
    middleware::{Next, from_fn_with_state},
    response::Response,
};

use permkit_auth::{Guard, GuardError, Permission};

use crate::app::errors;
use crate::context::RequestContext;

#[derive(Clone)]
pub struct GuardState {
    pub guard: Guard<RequestContext>,
}

impl GuardState {
    pub fn new(permission: impl Into<Guard<RequestContext>>) -> Self {
        Self {
            guard: permission.into(),
        }
    }
}

/// Evaluate the route's permission before the handler runs.
///
/// Raised denials and unresolvable inputs short-circuit into JSON errors.
/// Otherwise the outcome is stored in the request extensions, so handlers of
/// routes with `auto_raise` off can read it as `Extension<CheckOutcome>`.
pub async fn guard_middleware(
    State(state): State<GuardState>,
    path_params: Option<RawPathParams>,
    req: Request,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();
    let ctx = match &path_params {
        Some(params) => RequestContext::new(parts, params.iter()),
        None => RequestContext::new(parts, []),
    };

    let outcome = match state.guard.authorize(&ctx).await {
        Ok(outcome) => outcome,
        Err(GuardError::Denied(denied)) => return errors::access_denied_to_response(denied),
        Err(GuardError::Resolve(e)) => return errors::resolve_error_to_response(e),
    };

    let mut parts = ctx.into_parts();
    parts.extensions.insert(outcome);
    next.run(Request::from_parts(parts, body)).await
}

/// Protect every route currently in `router` with `permission`.
///
/// Uses `route_layer`, so unmatched paths still 404 instead of being checked.
pub fn guard<S>(router: Router<S>, permission: Permission<RequestContext>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(from_fn_with_state(GuardState::new(permission), guard_middleware))
}
