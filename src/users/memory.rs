use super::{NewUser, StoreError, StoredIdentity, UserStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug)]
struct Record {
    id: Uuid,
    user: NewUser,
}

/// Process-local store, used by the tests and when no DSN is configured.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, Record>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("user map lock poisoned".to_string())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredIdentity>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(username).map(|record| StoredIdentity {
            user_id: record.id,
            username: record.user.username.clone(),
            password_hash: record.user.password_hash.clone(),
        }))
    }

    async fn insert_user(&self, user: NewUser) -> Result<Uuid, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.contains_key(&user.username) {
            return Err(StoreError::Duplicate);
        }

        let id = Uuid::new_v4();
        users.insert(user.username.clone(), Record { id, user });
        Ok(id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.users.read().map(|_| ()).map_err(poisoned)
    }
}
