//! Post authorship rules.
//!
//! Enforcement happens in the store: every owner-scoped mutation filters on
//! `id AND user_id`, so a foreign post is never touched. The functions here
//! only turn the outcome into a useful error.

use uuid::Uuid;

use crate::domain::{Post, PostId};
use crate::error::DomainError;
use crate::ports::PostStore;

/// Check that `acting_user` owns `post`.
pub fn ensure_owner(post: &Post, acting_user: Uuid) -> Result<(), DomainError> {
    if post.user_id == acting_user {
        Ok(())
    } else {
        Err(DomainError::PermissionDenied)
    }
}

/// Classify an owner-scoped mutation that matched zero rows.
///
/// Reads the post by id: present under another owner means
/// `PermissionDenied`, anything else is `NotFound`. A failed read leaves the
/// caller with `NotFound`, the answer when no prior read happened.
pub async fn explain_zero_rows<S>(store: &S, id: PostId, acting_user: Uuid) -> DomainError
where
    S: PostStore + ?Sized,
{
    match store.find_by_id(id).await {
        Ok(Some(post)) => match ensure_owner(&post, acting_user) {
            Err(denied) => {
                tracing::warn!(
                    post_id = id,
                    acting_user = %acting_user,
                    "Rejected mutation of a post owned by another account"
                );
                denied
            }
            // Owned but unmatched: removed between the mutation and this read.
            Ok(()) => DomainError::NotFound,
        },
        Ok(None) => DomainError::NotFound,
        Err(e) => {
            tracing::debug!(post_id = id, error = %e, "Advisory ownership read failed");
            DomainError::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FakePostStore;

    #[test]
    fn test_ensure_owner() {
        let owner = Uuid::new_v4();
        let post = FakePostStore::sample_post(1, owner, "mine");

        assert!(ensure_owner(&post, owner).is_ok());
        assert!(matches!(
            ensure_owner(&post, Uuid::new_v4()),
            Err(DomainError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_foreign_post_is_permission_denied() {
        let owner = Uuid::new_v4();
        let store = FakePostStore::with_posts(vec![FakePostStore::sample_post(5, owner, "b")]);

        let err = explain_zero_rows(&store, 5, Uuid::new_v4()).await;
        assert!(matches!(err, DomainError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found() {
        let store = FakePostStore::default();
        let err = explain_zero_rows(&store, 42, Uuid::new_v4()).await;
        assert!(matches!(err, DomainError::NotFound));
    }

    #[tokio::test]
    async fn test_failed_read_is_not_found() {
        let store = FakePostStore::default();
        store.fail_next_with_transport();

        let err = explain_zero_rows(&store, 1, Uuid::new_v4()).await;
        assert!(matches!(err, DomainError::NotFound));
    }
}
