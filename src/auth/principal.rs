//! Authenticated request identity.
//!
//! The Access Guard inserts a [`Principal`] into the request extensions after a
//! token verifies. Handlers read it with `Extension<Principal>`; it is rebuilt
//! from the token on every request and never cached.

use super::{role::Role, token::VerifiedToken};

/// Identity proven by the presented bearer token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
}

impl From<VerifiedToken> for Principal {
    fn from(token: VerifiedToken) -> Self {
        Self {
            user_id: token.user_id,
            role: token.role,
        }
    }
}
