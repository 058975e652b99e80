//! In-memory post store - used when no database is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{NewPost, Post, PostChanges, PostId};
use quill_core::ports::PostStore;
use quill_core::{StoreError, StoreErrorCode};

#[derive(Default)]
struct Table {
    next_id: PostId,
    rows: BTreeMap<PostId, Post>,
}

impl Table {
    fn slug_taken(&self, slug: &str, except: Option<PostId>) -> bool {
        self.rows
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except)
    }
}

/// Post store over a `BTreeMap` behind an async RwLock.
/// Enforces the unique slug constraint. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryPostStore {
    table: RwLock<Table>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_violation() -> StoreError {
    StoreError::rejected(
        StoreErrorCode::UniqueViolation,
        "duplicate key value violates unique constraint \"posts_slug_key\"",
    )
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    posts
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut table = self.table.write().await;
        if table.slug_taken(post.slug.as_str(), None) {
            return Err(unique_violation());
        }

        table.next_id += 1;
        let stored = Post {
            id: table.next_id,
            title: post.title,
            slug: post.slug.into_inner(),
            content: post.content,
            cover_url: post.cover_url,
            user_id: post.user_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        };
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_owned(
        &self,
        id: PostId,
        owner: Uuid,
        changes: PostChanges,
    ) -> Result<Option<Post>, StoreError> {
        let mut table = self.table.write().await;
        // Ownership filter first: an unmatched row never reports a conflict.
        if !table.rows.get(&id).is_some_and(|p| p.user_id == owner) {
            return Ok(None);
        }
        if let Some(slug) = &changes.slug {
            if table.slug_taken(slug.as_str(), Some(id)) {
                return Err(unique_violation());
            }
        }

        Ok(table.rows.get_mut(&id).map(|post| {
            changes.apply_to(post);
            post.clone()
        }))
    }

    async fn delete_owned(&self, id: PostId, owner: Uuid) -> Result<u64, StoreError> {
        let mut table = self.table.write().await;
        let owned = table.rows.get(&id).is_some_and(|p| p.user_id == owner);
        if owned {
            table.rows.remove(&id);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|p| p.slug == slug).cloned())
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Post>, StoreError> {
        let table = self.table.read().await;
        Ok(newest_first(
            table
                .rows
                .values()
                .filter(|p| p.user_id == owner)
                .cloned()
                .collect(),
        ))
    }

    async fn list_all(&self) -> Result<Vec<Post>, StoreError> {
        let table = self.table.read().await;
        Ok(newest_first(table.rows.values().cloned().collect()))
    }
}
