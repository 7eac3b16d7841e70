//! Persistence boundary for users, reports and alerts.
//!
//! Handlers only see the [`Store`] trait. [`postgres::PgStore`] is the
//! production implementation; [`memory::MemoryStore`] backs tests and local
//! runs without a database. Ownership is enforced by the caller, not here.

use crate::auth::Role;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid stored value: {0}")]
    InvalidData(String),
    #[error("store unavailable")]
    Unavailable,
}

/// Registered account. The password hash is never serialized.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub password_hash: String,
}

/// Fields needed to create a user; `email` must already be normalized.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Report {
    pub report_id: i64,
    pub user_id: i64,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Alert {
    pub alert_id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user. Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Look up a user by normalized email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert_report(&self, user_id: i64, details: &str) -> Result<Report, StoreError>;

    async fn find_alerts_by_user(&self, user_id: i64) -> Result<Vec<Alert>, StoreError>;

    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}
