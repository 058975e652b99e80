use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::StoreError;
use quill_core::domain::Profile;
use quill_core::ports::ProfileStore;

/// In-memory profile store.
#[derive(Default)]
pub struct InMemoryProfileStore {
    rows: RwLock<HashMap<Uuid, Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile, StoreError> {
        let mut rows = self.rows.write().await;
        // created_at survives a replace, like the ON CONFLICT column list.
        let profile = match rows.get(&profile.id) {
            Some(existing) => Profile {
                created_at: existing.created_at,
                ..profile
            },
            None => profile,
        };
        rows.insert(profile.id, profile.clone());
        Ok(profile)
    }
}
