use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{User, normalize_email};
use quill_core::ports::UserRepository;
use quill_core::{StoreError, StoreErrorCode};

/// In-memory account table keyed by id, unique on email.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = normalize_email(email);
        let rows = self.rows.read().await;
        Ok(rows.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|u| u.email == user.email) {
            return Err(StoreError::rejected(
                StoreErrorCode::UniqueViolation,
                "duplicate key value violates unique constraint \"users_email_key\"",
            ));
        }
        rows.insert(user.id, user.clone());
        Ok(user)
    }
}
