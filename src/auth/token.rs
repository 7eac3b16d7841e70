//! Signed, time-limited session tokens (`HS256` JWT).
//!
//! Flow Overview: login calls [`TokenService::issue`] with the user id and role;
//! the Access Guard calls [`TokenService::verify`] on every protected request.
//! Verification reads the clock once and compares `now < exp`, so a token is
//! valid strictly before its expiry instant and invalid at or after it.

use super::role::Role;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use ulid::Ulid;

/// Default session lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Single undifferentiated verification failure (signature, encoding, expiry).
    #[error("token is invalid or expired")]
    Invalid,
    #[error("signing secret must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,
    #[error("token ttl must be greater than zero")]
    InvalidTtl,
    #[error("failed to sign token")]
    Sign,
}

/// Claims carried inside a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}

/// Identity recovered from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: i64,
    pub role: Role,
}

/// Issues and verifies session tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"***")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a token service from the signing secret and token lifetime.
    ///
    /// # Errors
    /// Returns an error if the secret is too short or the ttl is zero.
    pub fn new(secret: &SecretString, ttl: Duration) -> Result<Self, TokenError> {
        let secret = secret.expose_secret().as_bytes();
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }
        if ttl.is_zero() {
            return Err(TokenError::InvalidTtl);
        }

        // Expiry is checked by hand against a single clock read.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` and `role`, valid for the configured ttl.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, TokenError> {
        self.issue_at(user_id, role, now_unix_seconds())
    }

    pub(crate) fn issue_at(&self, user_id: i64, role: Role, now: u64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
            jti: Ulid::new().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Sign)
    }

    /// Verify signature and expiry, returning the bound identity.
    ///
    /// # Errors
    /// Returns [`TokenError::Invalid`] for every kind of failure.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.verify_at(token, now_unix_seconds())
    }

    pub(crate) fn verify_at(&self, token: &str, now: u64) -> Result<VerifiedToken, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::Invalid)?
            .claims;

        if now >= claims.exp {
            return Err(TokenError::Invalid);
        }

        let user_id = claims.sub.parse::<i64>().map_err(|_| TokenError::Invalid)?;

        Ok(VerifiedToken {
            user_id,
            role: claims.role,
        })
    }
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use base64ct::{Base64UrlUnpadded, Encoding};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service() -> TokenService {
        TokenService::new(&SecretString::from(SECRET.to_string()), DEFAULT_TOKEN_TTL).unwrap()
    }

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let tokens = service();
        let token = tokens.issue(42, Role::Citizen).unwrap();
        let verified = tokens.verify(&token).unwrap();
        assert_eq!(
            verified,
            VerifiedToken {
                user_id: 42,
                role: Role::Citizen
            }
        );
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let tokens = service();
        let issued_at = 1_700_000_000;
        let expires_at = issued_at + DEFAULT_TOKEN_TTL.as_secs();
        let token = tokens.issue_at(7, Role::Admin, issued_at).unwrap();

        assert!(tokens.verify_at(&token, issued_at).is_ok());
        assert!(tokens.verify_at(&token, expires_at - 1).is_ok());
        assert!(matches!(
            tokens.verify_at(&token, expires_at),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(
            tokens.verify_at(&token, expires_at + 1),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other = TokenService::new(
            &SecretString::from("ffffffffffffffffffffffffffffffff".to_string()),
            DEFAULT_TOKEN_TTL,
        )
        .unwrap();
        let token = other.issue(1, Role::Citizen).unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn tampered_claims_are_invalid() {
        let tokens = service();
        let token = tokens.issue(1, Role::Citizen).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = Base64UrlUnpadded::encode_string(
            br#"{"sub":"2","role":"admin","iat":0,"exp":99999999999,"jti":"x"}"#,
        );
        parts[1] = &forged;
        let forged_token = parts.join(".");
        assert!(matches!(
            tokens.verify(&forged_token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let tokens = service();
        for token in ["", "abc", "a.b.c", "a.b.c.d"] {
            assert!(matches!(tokens.verify(token), Err(TokenError::Invalid)));
        }
    }

    #[test]
    fn failures_share_one_message() {
        let tokens = service();
        let expired = tokens.issue_at(1, Role::Citizen, 10).unwrap();
        let expired_err = tokens.verify(&expired).unwrap_err().to_string();
        let malformed_err = tokens.verify("nope").unwrap_err().to_string();
        assert_eq!(expired_err, malformed_err);
    }

    #[test]
    fn weak_secret_and_zero_ttl_are_rejected() {
        assert!(matches!(
            TokenService::new(&SecretString::from("short".to_string()), DEFAULT_TOKEN_TTL),
            Err(TokenError::WeakSecret)
        ));
        assert!(matches!(
            TokenService::new(&SecretString::from(SECRET.to_string()), Duration::ZERO),
            Err(TokenError::InvalidTtl)
        ));
    }

    #[test]
    fn debug_output_hides_keys() {
        let rendered = format!("{:?}", service());
        assert!(!rendered.contains(SECRET));
    }
}
