//! # Ghabaty (Incident Reporting & Alerting API)
//!
//! `ghabaty` lets citizens register, sign in, submit incident reports and read
//! the alerts addressed to them.
//!
//! ## Trust Boundary
//!
//! - **Credentials:** Passwords are stored only as salted `Argon2id` hashes and
//!   are never returned by the API.
//! - **Sessions:** Login issues a stateless `HS256` bearer token that binds the
//!   user id and role and expires after a fixed lifetime (1 hour by default).
//!   There is no server-side revocation; a token stays valid until it expires.
//! - **Access Guard:** Protected routes require `Authorization: Bearer <token>`.
//!   Missing, malformed, forged and expired tokens are rejected with the same
//!   `401` response before any database access happens.
//! - **Ownership:** A user may only read their own alerts and may only file
//!   reports attributed to themselves. Mismatches return `403`.
//!
//! ## Failure Reporting
//!
//! Login never reveals whether an email exists. Infrastructure errors are logged
//! server-side and surface to clients as an opaque `500`.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
