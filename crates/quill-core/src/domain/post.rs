use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::Slug;

/// Store-assigned post identifier.
pub type PostId = i64;

/// Post entity - a published blog post as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub content: String,
    /// Empty string when the post has no cover.
    pub cover_url: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw author input for a new post, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub cover_url: Option<String>,
}

/// Raw author input for an update. Absent fields are left untouched,
/// except `cover_url` which is cleared when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub cover_url: Option<String>,
}

/// A validated row ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub slug: Slug,
    pub content: String,
    pub cover_url: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewPost {
    /// Build an insertable row stamped with the current time.
    pub fn new(
        user_id: Uuid,
        title: String,
        slug: Slug,
        content: String,
        cover_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            title,
            slug,
            content,
            cover_url: cover_url.unwrap_or_default(),
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A validated change-set. Has no `user_id`: ownership is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub content: Option<String>,
    pub cover_url: String,
    pub updated_at: DateTime<Utc>,
}

impl PostChanges {
    /// Apply the change-set to a stored post.
    pub fn apply_to(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(slug) = &self.slug {
            post.slug = slug.as_str().to_string();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        post.cover_url = self.cover_url.clone();
        post.updated_at = self.updated_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_post() -> Post {
        let at = Utc::now();
        Post {
            id: 1,
            title: "Old".to_string(),
            slug: "old".to_string(),
            content: "Body".to_string(),
            cover_url: "https://cdn.example.com/a.png".to_string(),
            user_id: Uuid::new_v4(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_new_post_defaults_cover_to_empty() {
        let post = NewPost::new(
            Uuid::new_v4(),
            "Title".to_string(),
            Slug::parse("title").unwrap(),
            "Body".to_string(),
            None,
        );
        assert_eq!(post.cover_url, "");
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_apply_keeps_owner_and_creation_time() {
        let mut post = stored_post();
        let owner = post.user_id;
        let created = post.created_at;

        let changes = PostChanges {
            title: Some("New".to_string()),
            slug: None,
            content: None,
            cover_url: String::new(),
            updated_at: Utc::now(),
        };
        changes.apply_to(&mut post);

        assert_eq!(post.title, "New");
        assert_eq!(post.slug, "old");
        assert_eq!(post.cover_url, "");
        assert_eq!(post.user_id, owner);
        assert_eq!(post.created_at, created);
    }
}
