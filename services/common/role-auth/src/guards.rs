use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::resolver::RoleResolver;
use crate::roles::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardError {
    OperatorRequired,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: &'static str,
}

// The body is identical for every denial so callers learn nothing about why
// elevation failed.
impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let body = match self {
            GuardError::OperatorRequired => ErrorBody {
                code: "OPERATOR_REQUIRED",
                message: "operator role required",
            },
        };
        (StatusCode::FORBIDDEN, Json(body)).into_response()
    }
}

pub fn ensure_operator(role: Role) -> Result<(), GuardError> {
    if role.is_operator() {
        Ok(())
    } else {
        Err(GuardError::OperatorRequired)
    }
}

/// Middleware that resolves the caller's role once and stores it in the
/// request extensions, where the [`Role`] extractor picks it up.
pub async fn resolve_role(
    State(resolver): State<Arc<RoleResolver>>,
    mut request: Request,
    next: Next,
) -> Response {
    let role = resolver.role_for_request(&request);
    request.extensions_mut().insert(role);
    next.run(request).await
}

/// Middleware for operator-only routes.
pub async fn require_operator(
    State(resolver): State<Arc<RoleResolver>>,
    mut request: Request,
    next: Next,
) -> Response {
    let role = match request.extensions().get::<Role>() {
        Some(role) => *role,
        None => resolver.role_for_request(&request),
    };

    if let Err(err) = ensure_operator(role) {
        debug!(path = %request.uri().path(), "operator route denied");
        return err.into_response();
    }

    request.extensions_mut().insert(role);
    next.run(request).await
}
