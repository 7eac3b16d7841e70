//! Access Guard: bearer token middleware for protected routes.
//!
//! Flow Overview: read `Authorization: Bearer <token>`, verify it with the
//! [`TokenService`], attach a [`Principal`] to the request extensions and hand
//! off to the next layer. The guard only needs the token and the signing
//! secret; it never touches the store.

use super::{principal::Principal, token::TokenService};
use crate::api::ApiError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

const BEARER_SCHEME: &str = "bearer";

/// Extract the bearer token from the `Authorization` header.
///
/// Missing header, non-ASCII value, wrong scheme and empty token all yield `None`.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Reject requests without a valid session token.
///
/// # Errors
/// Returns [`ApiError::Unauthenticated`] for missing, malformed, forged or
/// expired tokens. The cause is logged but never returned to the client.
pub async fn require_bearer(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(request.headers()) else {
        debug!("missing or malformed authorization header");
        return Err(ApiError::Unauthenticated);
    };

    let verified = tokens.verify(token).map_err(|err| {
        debug!(error = %err, "bearer token rejected");
        ApiError::Unauthenticated
    })?;

    request.extensions_mut().insert(Principal::from(verified));

    Ok(next.run(request).await)
}
