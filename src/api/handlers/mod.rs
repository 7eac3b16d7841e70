//! API handlers and shared helpers.

pub mod alerts;
pub mod health;
pub mod reports;
pub mod root;
pub mod user_login;
pub mod user_register;

use crate::{api::ApiError, auth::PasswordHasher};
use regex::Regex;
use std::sync::Arc;
use tracing::error;

/// Normalize an email for lookup/uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Trimmed value of a required text field, or a validation error naming it.
pub(crate) fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::validation(format!("{field} is required")))
    } else {
        Ok(trimmed)
    }
}

/// Run an `Argon2id` job off the async workers.
pub(crate) async fn run_hasher<T, F>(hasher: &Arc<PasswordHasher>, job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&PasswordHasher) -> T + Send + 'static,
{
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || job(&hasher))
        .await
        .map_err(|err| {
            error!("Password hashing task failed: {err}");
            ApiError::Internal
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Ana@X.COM "), "ana@x.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@x.com"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("a b@x.com"));
    }

    #[test]
    fn required_rejects_blank() {
        assert_eq!(required("  Ana ", "Name").ok(), Some("Ana"));
        match required("   ", "Name") {
            Err(ApiError::Validation(message)) => assert_eq!(message, "Name is required"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
