use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Profile, ProfileChanges};
use crate::error::{DomainError, StoreError, StoreErrorCode};
use crate::ports::ProfileStore;

/// Profile reads and writes for the signed-in account.
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// The stored profile, or a freshly created default one.
    pub async fn get_or_create(&self, user_id: Uuid, email: &str) -> Result<Profile, DomainError> {
        let found = match self.store.find(user_id).await {
            Ok(found) => found,
            Err(StoreError::Rejected {
                code: StoreErrorCode::NoRows,
                ..
            }) => None,
            Err(e) => return Err(map_profile_error(e)),
        };

        match found {
            Some(profile) => Ok(profile),
            None => {
                tracing::info!(user_id = %user_id, "Creating default profile");
                self.store
                    .upsert(Profile::default_for(user_id, email))
                    .await
                    .map_err(map_profile_error)
            }
        }
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        email: &str,
        changes: ProfileChanges,
    ) -> Result<Profile, DomainError> {
        if changes.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        let mut profile = self.get_or_create(user_id, email).await?;
        changes.apply_to(&mut profile);
        self.store
            .upsert(profile)
            .await
            .map_err(map_profile_error)
    }
}

fn map_profile_error(err: StoreError) -> DomainError {
    match err {
        StoreError::Transport(msg) => DomainError::Transport(msg),
        StoreError::Rejected { code, message } => match code {
            StoreErrorCode::InsufficientPrivilege => DomainError::PermissionDenied,
            StoreErrorCode::NoRows => DomainError::NotFound,
            _ => {
                tracing::error!(code = %code, error = %message, "Profile store error");
                DomainError::Backend(message)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProfiles {
        rows: Mutex<HashMap<Uuid, Profile>>,
        missing_as_no_rows: bool,
    }

    #[async_trait]
    impl ProfileStore for FakeProfiles {
        async fn find(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
            match self.rows.lock().unwrap().get(&id).cloned() {
                None if self.missing_as_no_rows => Err(StoreError::rejected(
                    StoreErrorCode::NoRows,
                    "no rows returned",
                )),
                found => Ok(found),
            }
        }

        async fn upsert(&self, profile: Profile) -> Result<Profile, StoreError> {
            self.rows.lock().unwrap().insert(profile.id, profile.clone());
            Ok(profile)
        }
    }

    #[tokio::test]
    async fn test_get_or_create_defaults_name() {
        let store = Arc::new(FakeProfiles {
            missing_as_no_rows: true,
            ..Default::default()
        });
        let service = ProfileService::new(store.clone());
        let id = Uuid::new_v4();

        let profile = service.get_or_create(id, "writer@example.com").await.unwrap();
        assert_eq!(profile.name, "writer");
        assert!(store.rows.lock().unwrap().contains_key(&id));

        let again = service.get_or_create(id, "other@example.com").await.unwrap();
        assert_eq!(again.name, "writer");
    }

    #[tokio::test]
    async fn test_update_requires_name() {
        let service = ProfileService::new(Arc::new(FakeProfiles::default()));
        let err = service
            .update(Uuid::new_v4(), "writer@example.com", ProfileChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_persists_changes() {
        let service = ProfileService::new(Arc::new(FakeProfiles::default()));
        let id = Uuid::new_v4();

        let profile = service
            .update(
                id,
                "writer@example.com",
                ProfileChanges {
                    name: "Writer".to_string(),
                    bio: Some("Notes on Rust".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.name, "Writer");
        let stored = service.get_or_create(id, "writer@example.com").await.unwrap();
        assert_eq!(stored.bio.as_deref(), Some("Notes on Rust"));
    }
}
