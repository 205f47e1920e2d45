use super::{NewUser, StoreError, StoredIdentity, UserStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::{Instrument, info_span};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Connect a small pool to `dsn`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredIdentity>, StoreError> {
        let row = sqlx::query("SELECT id, username, password FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(info_span!("db.query", db.system = "postgresql", db.operation = "SELECT"))
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(StoredIdentity {
            user_id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password")?,
        }))
    }

    async fn insert_user(&self, user: NewUser) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();

        let result = sqlx::query(
            "INSERT INTO users (id, username, password, gender, age, email, phone, address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.gender)
        .bind(user.age)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.address)
        .execute(&self.pool)
        .instrument(info_span!("db.query", db.system = "postgresql", db.operation = "INSERT"))
        .await;

        match result {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .instrument(info_span!("db.acquire", db.system = "postgresql", db.operation = "ACQUIRE"))
            .await?;

        conn.ping()
            .instrument(info_span!("db.ping", db.system = "postgresql", db.operation = "PING"))
            .await?;

        Ok(())
    }
}
