use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use permkit_auth::AccessDenied;
use permkit_core::{ResolveError, ResolveErrorKind};

/// Raised denial -> the status and message resolved on the root permission.
pub fn access_denied_to_response(denied: AccessDenied) -> axum::response::Response {
    let status = StatusCode::from_u16(denied.status).unwrap_or(StatusCode::FORBIDDEN);
    json_error(status, "permission_denied", denied.message)
}

/// Unabsorbed input failure -> status by failure kind.
pub fn resolve_error_to_response(err: ResolveError) -> axum::response::Response {
    let message = match err.slot() {
        Some(slot) => format!("{slot}: {err}"),
        None => err.to_string(),
    };

    match err.kind() {
        ResolveErrorKind::Validation => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", message)
        }
        ResolveErrorKind::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
        ResolveErrorKind::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message)
        }
        ResolveErrorKind::Other => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "resolution_error",
            message,
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_keeps_custom_status() {
        let res = access_denied_to_response(AccessDenied {
            status: 401,
            message: "Sign in first".into(),
        });
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn invalid_status_falls_back_to_forbidden() {
        let res = access_denied_to_response(AccessDenied {
            status: 42,
            message: "odd".into(),
        });
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn resolve_errors_map_by_kind() {
        let cases = [
            (ResolveError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (ResolveError::not_found("gone"), StatusCode::NOT_FOUND),
            (ResolveError::unauthenticated("who"), StatusCode::UNAUTHORIZED),
            (ResolveError::other("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(resolve_error_to_response(err).status(), status);
        }
    }
}
