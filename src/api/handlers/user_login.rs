//! Login: verify credentials and issue a session token.
//!
//! Internally the two failure branches (unknown email, wrong password) stay
//! separate so they can be logged and tested; externally both become the same
//! `401 Invalid credentials`. Unknown emails still pay the hashing cost.

use crate::{
    api::{
        ApiError,
        error::ErrorBody,
        handlers::{normalize_email, required, run_hasher},
    },
    auth::{PasswordHasher, TokenService},
    store::{Store, User},
};
use axum::{Json, extract::Extension};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserLogin {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl std::fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLogin")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
}

/// Why a credential check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoginFailure {
    UserNotFound,
    InvalidPassword,
}

/// Resolve `email`/`password` to a user.
pub(crate) async fn authenticate(
    store: &dyn Store,
    hasher: &Arc<PasswordHasher>,
    email: String,
    password: String,
) -> Result<Result<User, LoginFailure>, ApiError> {
    let Some(user) = store.find_user_by_email(&email).await? else {
        run_hasher(hasher, move |hasher| hasher.verify_dummy(&password)).await?;
        return Ok(Err(LoginFailure::UserNotFound));
    };

    let stored_hash = user.password_hash.clone();
    let valid = run_hasher(hasher, move |hasher| hasher.verify(&password, &stored_hash)).await?;

    if valid {
        Ok(Ok(user))
    } else {
        Ok(Err(LoginFailure::InvalidPassword))
    }
}

#[utoipa::path(
    post,
    path= "/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Missing email or password", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody),
    ),
    tag= "auth"
)]
// axum handler for login
#[instrument(skip(store, hasher, tokens, payload))]
pub async fn login(
    store: Extension<Arc<dyn Store>>,
    hasher: Extension<Arc<PasswordHasher>>,
    tokens: Extension<Arc<TokenService>>,
    payload: Option<Json<UserLogin>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(Json(credentials)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    let email = normalize_email(required(&credentials.email, "Email")?);
    if credentials.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = match authenticate(&**store, &hasher, email, credentials.password).await? {
        Ok(user) => user,
        Err(failure) => {
            debug!(?failure, "login rejected");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = tokens.issue(user.user_id, user.role).map_err(|err| {
        error!("Error issuing token: {err}");
        ApiError::Internal
    })?;

    info!(user_id = user.user_id, "user logged in");

    Ok(Json(LoginResponse { token }))
}
