//! PostgreSQL store. Every value is bound as a parameter.

use super::{Alert, NewUser, Report, Store, StoreError, User};
use crate::auth::Role;
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row, postgres::PgRow};
use tracing::{Instrument, info_span};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|err| StoreError::InvalidData(err.to_string()))?;

    Ok(User {
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role,
        created_at: row.try_get("created_at")?,
        password_hash: row.try_get("password")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let query = r"
            INSERT INTO users (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, name, email, password, role, created_at
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::DuplicateEmail
                } else {
                    StoreError::Database(err)
                }
            })?;

        user_from_row(&row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = r"
            SELECT user_id, name, email, password, role, created_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_report(&self, user_id: i64, details: &str) -> Result<Report, StoreError> {
        let query = r"
            INSERT INTO reports (user_id, details)
            VALUES ($1, $2)
            RETURNING report_id, user_id, details, created_at
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .bind(details)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;

        Ok(Report {
            report_id: row.try_get("report_id")?,
            user_id: row.try_get("user_id")?,
            details: row.try_get("details")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn find_alerts_by_user(&self, user_id: i64) -> Result<Vec<Alert>, StoreError> {
        let query = r"
            SELECT alert_id, user_id, title, description, created_at
            FROM alerts
            WHERE user_id = $1
            ORDER BY created_at DESC, alert_id DESC
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        rows.iter()
            .map(|row| -> Result<Alert, StoreError> {
                Ok(Alert {
                    alert_id: row.try_get("alert_id")?,
                    user_id: row.try_get("user_id")?,
                    title: row.try_get("title")?,
                    description: row.try_get("description")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}
