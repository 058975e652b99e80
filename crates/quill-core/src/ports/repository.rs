use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostChanges, PostId, Profile, User};
use crate::error::StoreError;

/// Row-oriented access to the `posts` table.
///
/// Owner-scoped mutations filter on `id AND user_id`; a row owned by someone
/// else is simply not matched. Listings are ordered by `created_at`
/// descending.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert one row and return it as stored.
    async fn insert(&self, post: NewPost) -> Result<Post, StoreError>;

    /// Update the row matching `id` and `owner`. `None` when nothing matched.
    async fn update_owned(
        &self,
        id: PostId,
        owner: Uuid,
        changes: PostChanges,
    ) -> Result<Option<Post>, StoreError>;

    /// Delete the row matching `id` and `owner`, returning rows affected.
    async fn delete_owned(&self, id: PostId, owner: Uuid) -> Result<u64, StoreError>;

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError>;

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Post>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Post>, StoreError>;
}

/// Access to the `profiles` table.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Insert or replace the profile keyed by `profile.id`.
    async fn upsert(&self, profile: Profile) -> Result<Profile, StoreError>;
}

/// Account storage used by the local auth backend.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new account. Fails with a unique violation on a taken email.
    async fn insert(&self, user: User) -> Result<User, StoreError>;
}
