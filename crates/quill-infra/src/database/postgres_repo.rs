//! PostgreSQL store implementations.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use quill_core::StoreError;
use quill_core::domain::{NewPost, Post, PostChanges, PostId, Profile, User, mask_email};
use quill_core::ports::{PostStore, ProfileStore, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::profile::{self, Entity as ProfileEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::errors::store_error;
use super::postgres_base::PostgresStore;

/// PostgreSQL post store.
pub type PostgresPostStore = PostgresStore<PostEntity>;

/// PostgreSQL profile store.
pub type PostgresProfileStore = PostgresStore<ProfileEntity>;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresStore<UserEntity>;

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn insert(&self, new_post: NewPost) -> Result<Post, StoreError> {
        let model = post::ActiveModel::from(new_post)
            .insert(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.into())
    }

    async fn update_owned(
        &self,
        id: PostId,
        owner: Uuid,
        changes: PostChanges,
    ) -> Result<Option<Post>, StoreError> {
        let updated = PostEntity::update_many()
            .set(post::ActiveModel::from(changes))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::UserId.eq(owner))
            .exec_with_returning(&self.db)
            .await
            .map_err(store_error)?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    async fn delete_owned(&self, id: PostId, owner: Uuid) -> Result<u64, StoreError> {
        let result = PostEntity::delete_many()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::UserId.eq(owner))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        self.find_by_pk(id).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let found = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(found.map(Into::into))
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Post>, StoreError> {
        let rows = PostEntity::find()
            .filter(post::Column::UserId.eq(owner))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<Post>, StoreError> {
        let rows = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn find(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.find_by_pk(id).await
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile, StoreError> {
        let model = ProfileEntity::insert(profile::ActiveModel::from(profile))
            .on_conflict(
                OnConflict::column(profile::Column::Id)
                    .update_columns([
                        profile::Column::Name,
                        profile::Column::DisplayName,
                        profile::Column::AvatarUrl,
                        profile::Column::Website,
                        profile::Column::Bio,
                        profile::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(store_error)?;

        Ok(model.into())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.find_by_pk(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let found = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(found.map(Into::into))
    }

    async fn insert(&self, new_user: User) -> Result<User, StoreError> {
        let model = user::ActiveModel::from(new_user)
            .insert(&self.db)
            .await
            .map_err(store_error)?;
        Ok(model.into())
    }
}
