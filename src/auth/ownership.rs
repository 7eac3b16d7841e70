//! Per-request ownership checks.
//!
//! Runs after the Access Guard. A user may only read alerts addressed to them and
//! may only file reports attributed to themselves; role does not widen access.

use super::principal::Principal;
use crate::api::ApiError;
use tracing::warn;

/// Allow the request only when `owner_id` is the authenticated user.
///
/// # Errors
/// Returns [`ApiError::Forbidden`] on mismatch.
pub fn require_owner(principal: &Principal, owner_id: i64) -> Result<(), ApiError> {
    if principal.user_id == owner_id {
        Ok(())
    } else {
        warn!(
            user_id = principal.user_id,
            owner_id, "rejected access to a resource owned by another user"
        );
        Err(ApiError::Forbidden)
    }
}

/// Ownership check for an owner id taken verbatim from a URL path segment.
///
/// A segment that is not a user id can never match the principal.
///
/// # Errors
/// Returns [`ApiError::Forbidden`] if the segment is not the caller's id.
pub fn require_owner_segment(principal: &Principal, segment: &str) -> Result<i64, ApiError> {
    let Ok(owner_id) = segment.trim().parse::<i64>() else {
        warn!(
            user_id = principal.user_id,
            "rejected access with a non-numeric owner id"
        );
        return Err(ApiError::Forbidden);
    };
    require_owner(principal, owner_id)?;
    Ok(owner_id)
}
