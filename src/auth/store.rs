use crate::auth::models::UserRecord;
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{Instrument, info_span, instrument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read-only lookup of stored users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the user whose email matches exactly, if any.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
}

/// Postgres-backed store reading the `users` table.
#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        company: row.try_get("company")?,
        password_hash: row.try_get("password")?,
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip_all)]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = "SELECT id::text AS id, name, email, company, password FROM users WHERE email = $1";
        let span = info_span!("db.query", db.system = "postgresql", db.operation = "SELECT");

        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }
}

/// In-process store keyed by email.
#[derive(Clone, Debug, Default)]
pub struct MemoryUserStore {
    users: HashMap<String, UserRecord>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(mut self, user: UserRecord) -> Self {
        self.insert(user);
        self
    }

    pub fn insert(&mut self, user: UserRecord) {
        self.users.insert(user.email.clone(), user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(email).cloned())
    }
}
