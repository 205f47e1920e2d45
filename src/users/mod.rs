//! User storage behind the login and registration handlers.
//!
//! The authentication core only reads [`StoredIdentity`] by username and
//! inserts new records; everything else about a user is opaque to it.

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user already exists")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// What login needs to know about a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredIdentity {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
}

/// Registration record. `password_hash` must already be salted and hashed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub gender: String,
    pub age: i32,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredIdentity>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if the username is taken.
    async fn insert_user(&self, user: NewUser) -> Result<Uuid, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
