//! In-memory store for tests and database-less local runs.

use super::{Alert, NewUser, Report, Store, StoreError, User};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    reports: Vec<Report>,
    alerts: Vec<Alert>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store with the same semantics as the PostgreSQL schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trait calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent trait call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Seed an alert, standing in for the external ingestion path.
    pub async fn insert_alert(&self, user_id: i64, title: &str, description: &str) -> Alert {
        let mut tables = self.tables.write().await;
        let alert = Alert {
            alert_id: tables.next_id(),
            user_id,
            title: title.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };
        tables.alerts.push(alert.clone());
        alert
    }

    /// Reports filed by `user_id`.
    pub async fn reports_for(&self, user_id: i64) -> Vec<Report> {
        self.tables
            .read()
            .await
            .reports
            .iter()
            .filter(|report| report.user_id == user_id)
            .cloned()
            .collect()
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::DuplicateEmail);
        }
        let created = User {
            user_id: tables.next_id(),
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: Utc::now(),
            password_hash: user.password_hash,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.enter()?;
        Ok(self
            .tables
            .read()
            .await
            .users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_report(&self, user_id: i64, details: &str) -> Result<Report, StoreError> {
        self.enter()?;
        let mut tables = self.tables.write().await;
        let report = Report {
            report_id: tables.next_id(),
            user_id,
            details: details.to_string(),
            created_at: Utc::now(),
        };
        tables.reports.push(report.clone());
        Ok(report)
    }

    async fn find_alerts_by_user(&self, user_id: i64) -> Result<Vec<Alert>, StoreError> {
        self.enter()?;
        Ok(self
            .tables
            .read()
            .await
            .alerts
            .iter()
            .rev()
            .filter(|alert| alert.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.enter()
    }
}
