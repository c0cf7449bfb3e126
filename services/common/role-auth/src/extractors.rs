use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use crate::resolver::RoleResolver;
use crate::roles::Role;

/// Returns the bearer token carried by the `Authorization` header, if any.
///
/// A missing, repeated or malformed header is not an error; it just means the
/// request carries no usable token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let mut values = headers.get_all(AUTHORIZATION).iter();
    let value = values.next()?;
    if values.next().is_some() {
        return None;
    }

    let raw = value.to_str().ok()?.trim();
    let (scheme, token) = raw.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }

    Some(token)
}

/// Resolves the caller's role from the shared [`RoleResolver`]. Never rejects:
/// anything short of a valid operator claim yields [`Role::Viewer`].
#[async_trait]
impl<S> FromRequestParts<S> for Role
where
    Arc<RoleResolver>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(role) = parts.extensions.get::<Role>() {
            return Ok(*role);
        }

        let resolver = Arc::<RoleResolver>::from_ref(state);
        Ok(resolver.role_for_headers(&parts.headers))
    }
}
