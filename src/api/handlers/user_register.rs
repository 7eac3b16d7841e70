use crate::{
    api::{
        ApiError,
        error::ErrorBody,
        handlers::{normalize_email, required, run_hasher, valid_email},
    },
    auth::{PasswordHasher, Role},
    store::{NewUser, Store, User},
};
use axum::{Json, extract::Extension, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserRegister {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    /// `citizen` (default) or `admin`.
    #[serde(default)]
    role: Option<String>,
}

impl std::fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegister")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

#[utoipa::path(
    post,
    path= "/register",
    request_body = UserRegister,
    responses (
        (status = 201, description = "Registration successful", body = User, content_type = "application/json"),
        (status = 400, description = "Missing or invalid field", body = ErrorBody),
        (status = 409, description = "User with the specified email already exists", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody),
    ),
    tag= "auth"
)]
// axum handler for register
#[instrument(skip(store, hasher, payload))]
pub async fn register(
    store: Extension<Arc<dyn Store>>,
    hasher: Extension<Arc<PasswordHasher>>,
    payload: Option<Json<UserRegister>>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Some(Json(user)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    debug!("user: {:?}", user);

    let name = required(&user.name, "Name")?.to_string();
    let email = normalize_email(required(&user.email, "Email")?);
    if !valid_email(&email) {
        return Err(ApiError::validation("Invalid email"));
    }
    if user.password.trim().is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    let role = match user.role.as_deref().map(str::trim) {
        None | Some("") => Role::default(),
        Some(role) => role
            .parse::<Role>()
            .map_err(|_| ApiError::validation("Invalid role"))?,
    };

    let password = user.password;
    let password_hash = run_hasher(&hasher, move |hasher| hasher.hash(&password))
        .await?
        .map_err(|err| {
            tracing::error!("Error hashing password: {err}");
            ApiError::Internal
        })?;

    let created = store
        .insert_user(NewUser {
            name,
            email,
            password_hash,
            role,
        })
        .await?;

    info!(user_id = created.user_id, role = %created.role, "user registered");

    Ok((StatusCode::CREATED, Json(created)))
}
