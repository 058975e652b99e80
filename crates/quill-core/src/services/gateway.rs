//! Post mutation gateway.
//!
//! The only path by which posts are created, changed or removed. Input is
//! validated and slugs normalized before the store is called; store error
//! codes are folded into [`DomainError`].

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostChanges, PostDraft, PostId, PostPatch, Slug};
use crate::error::{DomainError, StoreError, StoreErrorCode};
use crate::ports::PostStore;

use super::authorship::{ensure_owner, explain_zero_rows};

/// Post operations over an injected store handle.
pub struct PostGateway<S: ?Sized = dyn PostStore> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for PostGateway<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> PostGateway<S>
where
    S: PostStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a post owned by `owner_id`.
    pub async fn create_post(&self, draft: PostDraft, owner_id: Uuid) -> Result<Post, DomainError> {
        let title = required("title", draft.title)?;
        let content = required("content", draft.content)?;
        let raw_slug = required("slug", draft.slug)?;
        if owner_id.is_nil() {
            return Err(DomainError::validation("owner is required"));
        }
        let slug = Slug::parse(&raw_slug)?;

        let new_post = NewPost::new(owner_id, title, slug, content, draft.cover_url);
        let slug_text = new_post.slug.as_str().to_string();

        tracing::debug!(slug = %slug_text, owner_id = %owner_id, "Creating post");

        let post = self
            .store
            .insert(new_post)
            .await
            .map_err(|e| map_store_error(e, Some(&slug_text)))?;

        tracing::info!(post_id = post.id, slug = %post.slug, "Post created");
        Ok(post)
    }

    /// Update a post, scoped to `id AND user_id = owner_id`.
    pub async fn update_post(
        &self,
        id: PostId,
        owner_id: Uuid,
        patch: PostPatch,
    ) -> Result<Post, DomainError> {
        let changes = PostChanges {
            title: patch.title.map(|t| required("title", t)).transpose()?,
            slug: patch
                .slug
                .map(|s| required("slug", s).and_then(|s| Slug::parse(&s)))
                .transpose()?,
            content: patch.content.map(|c| required("content", c)).transpose()?,
            cover_url: patch.cover_url.unwrap_or_default(),
            updated_at: Utc::now(),
        };
        let slug_text = changes.slug.as_ref().map(|s| s.as_str().to_string());

        tracing::debug!(post_id = id, owner_id = %owner_id, "Updating post");

        let updated = self
            .store
            .update_owned(id, owner_id, changes)
            .await
            .map_err(|e| map_store_error(e, slug_text.as_deref()))?;

        match updated {
            Some(post) => {
                tracing::info!(post_id = post.id, "Post updated");
                Ok(post)
            }
            None => Err(explain_zero_rows(self.store.as_ref(), id, owner_id).await),
        }
    }

    /// Delete a post, scoped like [`update_post`](Self::update_post).
    /// `Ok(false)` when there was nothing to delete.
    pub async fn delete_post(&self, id: PostId, owner_id: Uuid) -> Result<bool, DomainError> {
        let removed = self
            .store
            .delete_owned(id, owner_id)
            .await
            .map_err(|e| map_store_error(e, None))?;

        if removed == 1 {
            tracing::info!(post_id = id, "Post deleted");
        } else {
            tracing::debug!(post_id = id, owner_id = %owner_id, removed, "Nothing deleted");
        }
        Ok(removed == 1)
    }

    /// Public lookup by exact slug. Unknown or non-canonical slugs are `Ok(None)`.
    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        if !Slug::is_normalized(slug) {
            tracing::debug!(slug, "Non-canonical slug lookup");
            return Ok(None);
        }
        match self.store.find_by_slug(slug).await {
            Ok(post) => Ok(post),
            Err(StoreError::Rejected {
                code: StoreErrorCode::NoRows,
                ..
            }) => Ok(None),
            Err(e) => Err(map_store_error(e, None)),
        }
    }

    /// Fetch a post for editing by its owner.
    pub async fn get_owned_post(&self, id: PostId, owner_id: Uuid) -> Result<Post, DomainError> {
        let post = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| map_store_error(e, None))?
            .ok_or(DomainError::NotFound)?;
        ensure_owner(&post, owner_id)?;
        Ok(post)
    }

    /// Posts owned by `owner_id`, newest first.
    pub async fn list_owned_posts(&self, owner_id: Uuid) -> Result<Vec<Post>, DomainError> {
        self.store
            .list_by_owner(owner_id)
            .await
            .map_err(|e| map_store_error(e, None))
    }

    /// Every post, newest first.
    pub async fn list_all_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.store
            .list_all()
            .await
            .map_err(|e| map_store_error(e, None))
    }
}

/// Reject empty and whitespace-only values. The value is kept as typed.
fn required(field: &str, value: String) -> Result<String, DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(value)
}

/// Fold a store error into the domain taxonomy.
pub fn map_store_error(err: StoreError, slug: Option<&str>) -> DomainError {
    match err {
        StoreError::Transport(msg) => {
            tracing::error!(error = %msg, "Post store unreachable");
            DomainError::Transport(msg)
        }
        StoreError::Rejected { code, message } => match code {
            StoreErrorCode::UniqueViolation => {
                DomainError::SlugConflict(slug.unwrap_or_default().to_string())
            }
            StoreErrorCode::InsufficientPrivilege => DomainError::PermissionDenied,
            StoreErrorCode::NoRows => DomainError::NotFound,
            _ if message.to_lowercase().contains("permission denied") => {
                DomainError::PermissionDenied
            }
            StoreErrorCode::UndefinedTable => {
                tracing::error!(error = %message, "The posts table does not exist");
                DomainError::Backend(message)
            }
            StoreErrorCode::Other(code) => {
                tracing::error!(code = %code, error = %message, "Post store error");
                DomainError::Backend(message)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FakePostStore;
    use std::sync::atomic::Ordering;

    fn draft(title: &str, slug: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            slug: slug.to_string(),
            content: "Some content".to_string(),
            cover_url: None,
        }
    }

    fn gateway(store: FakePostStore) -> (PostGateway<FakePostStore>, Arc<FakePostStore>) {
        let store = Arc::new(store);
        (PostGateway::new(Arc::clone(&store)), store)
    }

    #[tokio::test]
    async fn test_create_normalizes_slug_and_cover() {
        let (gw, _) = gateway(FakePostStore::default());
        let owner = Uuid::new_v4();

        let post = gw
            .create_post(draft("Hello", "  Hello, World!  "), owner)
            .await
            .unwrap();

        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.cover_url, "");
        assert_eq!(post.user_id, owner);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields_without_store_call() {
        let (gw, store) = gateway(FakePostStore::default());
        let owner = Uuid::new_v4();

        for bad in [
            draft("", "slug"),
            draft("Title", ""),
            draft("Title", "!!!"),
            PostDraft {
                content: "   ".to_string(),
                ..draft("Title", "slug")
            },
        ] {
            let err = gw.create_post(bad, owner).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{err:?}");
        }
        let err = gw.create_post(draft("T", "t"), Uuid::nil()).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        assert_eq!(store.mutation_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_slug_collision_leaves_existing_post() {
        let owner = Uuid::new_v4();
        let existing = FakePostStore::sample_post(1, owner, "hello-world");
        let (gw, store) = gateway(FakePostStore::with_posts(vec![existing.clone()]));

        let err = gw
            .create_post(draft("Another", "Hello World"), Uuid::new_v4())
            .await
            .unwrap_err();

        match err {
            DomainError::SlugConflict(slug) => assert_eq!(slug, "hello-world"),
            other => panic!("expected SlugConflict, got {other:?}"),
        }
        assert_eq!(store.snapshot(1), Some(existing));
    }

    #[tokio::test]
    async fn test_create_maps_store_codes() {
        let (gw, store) = gateway(FakePostStore::default());
        let owner = Uuid::new_v4();

        store.fail_next_with(StoreError::rejected(
            StoreErrorCode::InsufficientPrivilege,
            "new row violates row-level security policy",
        ));
        let err = gw.create_post(draft("A", "a"), owner).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied));

        store.fail_next_with(StoreError::rejected(
            StoreErrorCode::Other("XX000".to_string()),
            "permission denied for table posts",
        ));
        let err = gw.create_post(draft("A", "a"), owner).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied));

        store.fail_next_with(StoreError::rejected(
            StoreErrorCode::UndefinedTable,
            "relation \"posts\" does not exist",
        ));
        let err = gw.create_post(draft("A", "a"), owner).await.unwrap_err();
        assert!(matches!(err, DomainError::Backend(msg) if msg.contains("does not exist")));

        store.fail_next_with_transport();
        let err = gw.create_post(draft("A", "a"), owner).await.unwrap_err();
        assert!(matches!(err, DomainError::Transport(_)));
    }

    #[tokio::test]
    async fn test_update_by_non_owner_changes_nothing() {
        let owner_b = Uuid::new_v4();
        let stored = FakePostStore::sample_post(5, owner_b, "b-post");
        let (gw, store) = gateway(FakePostStore::with_posts(vec![stored.clone()]));

        let err = gw
            .update_post(
                5,
                Uuid::new_v4(),
                PostPatch {
                    title: Some("Hijacked".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::PermissionDenied));
        assert_eq!(store.snapshot(5), Some(stored));
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let (gw, _) = gateway(FakePostStore::default());
        let err = gw
            .update_post(99, Uuid::new_v4(), PostPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[tokio::test]
    async fn test_update_renormalizes_slug_and_clears_absent_cover() {
        let owner = Uuid::new_v4();
        let mut stored = FakePostStore::sample_post(3, owner, "old");
        stored.cover_url = "https://cdn.example.com/c.png".to_string();
        let (gw, _) = gateway(FakePostStore::with_posts(vec![stored.clone()]));

        let post = gw
            .update_post(
                3,
                owner,
                PostPatch {
                    slug: Some("New  Slug!".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(post.slug, "new-slug");
        assert_eq!(post.cover_url, "");
        assert_eq!(post.title, stored.title);
        assert_eq!(post.created_at, stored.created_at);
        assert!(post.updated_at >= stored.updated_at);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_fields() {
        let owner = Uuid::new_v4();
        let (gw, store) = gateway(FakePostStore::with_posts(vec![
            FakePostStore::sample_post(1, owner, "one"),
        ]));

        let err = gw
            .update_post(
                1,
                owner,
                PostPatch {
                    slug: Some("???".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.mutation_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_slug_conflict() {
        let owner = Uuid::new_v4();
        let (gw, _) = gateway(FakePostStore::with_posts(vec![
            FakePostStore::sample_post(1, owner, "taken"),
            FakePostStore::sample_post(2, owner, "mine"),
        ]));

        let err = gw
            .update_post(
                2,
                owner,
                PostPatch {
                    slug: Some("Taken".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SlugConflict(s) if s == "taken"));
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let (gw, _) = gateway(FakePostStore::default());
        assert!(!gw.delete_post(12345, Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_scoped_to_owner() {
        let owner = Uuid::new_v4();
        let (gw, store) = gateway(FakePostStore::with_posts(vec![
            FakePostStore::sample_post(1, owner, "one"),
        ]));

        assert!(!gw.delete_post(1, Uuid::new_v4()).await.unwrap());
        assert!(store.snapshot(1).is_some());

        assert!(gw.delete_post(1, owner).await.unwrap());
        assert!(store.snapshot(1).is_none());
    }

    #[tokio::test]
    async fn test_delete_transport_failure_is_an_error() {
        let (gw, store) = gateway(FakePostStore::default());
        store.fail_next_with_transport();
        assert!(matches!(
            gw.delete_post(1, Uuid::new_v4()).await,
            Err(DomainError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_get_by_unknown_slug_is_none() {
        let (gw, store) = gateway(FakePostStore::default());
        assert_eq!(gw.get_post_by_slug("unknown-slug").await.unwrap(), None);
        assert_eq!(gw.get_post_by_slug("!!!").await.unwrap(), None);

        store.fail_next_with(StoreError::rejected(
            StoreErrorCode::NoRows,
            "JSON object requested, multiple (or no) rows returned",
        ));
        assert_eq!(gw.get_post_by_slug("gone").await.unwrap(), None);

        store.fail_next_with_transport();
        assert!(gw.get_post_by_slug("any").await.is_err());
    }

    #[tokio::test]
    async fn test_get_by_non_canonical_slug_is_none() {
        let (gw, _) = gateway(FakePostStore::default());
        gw.create_post(draft("Hello", "hello-world"), Uuid::new_v4())
            .await
            .unwrap();

        assert!(gw.get_post_by_slug("hello-world").await.unwrap().is_some());
        assert_eq!(gw.get_post_by_slug("Hello, World!!").await.unwrap(), None);
        assert_eq!(gw.get_post_by_slug("hello--world").await.unwrap(), None);
        assert_eq!(gw.get_post_by_slug("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_owned_post() {
        let owner = Uuid::new_v4();
        let (gw, _) = gateway(FakePostStore::with_posts(vec![
            FakePostStore::sample_post(1, owner, "one"),
        ]));

        assert_eq!(gw.get_owned_post(1, owner).await.unwrap().id, 1);
        assert!(matches!(
            gw.get_owned_post(1, Uuid::new_v4()).await,
            Err(DomainError::PermissionDenied)
        ));
        assert!(matches!(
            gw.get_owned_post(2, owner).await,
            Err(DomainError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_listings_are_newest_first() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let (gw, _) = gateway(FakePostStore::with_posts(vec![
            FakePostStore::sample_post(1, owner, "one"),
            FakePostStore::sample_post(2, other, "two"),
            FakePostStore::sample_post(3, owner, "three"),
        ]));

        let all: Vec<_> = gw.list_all_posts().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(all, vec![3, 2, 1]);

        let owned: Vec<_> = gw
            .list_owned_posts(owner)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(owned, vec![3, 1]);

        assert!(gw.list_owned_posts(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
