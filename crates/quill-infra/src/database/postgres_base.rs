use std::marker::PhantomData;

use sea_orm::{DbConn, EntityTrait, PrimaryKeyTrait};

use quill_core::StoreError;

use super::errors::store_error;

/// A SeaORM connection bound to one entity.
pub struct PostgresStore<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresStore<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Primary-key lookup converted to a domain type.
    pub(crate) async fn find_by_pk<T, ID>(&self, id: ID) -> Result<Option<T>, StoreError>
    where
        ID: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
        T: From<E::Model>,
    {
        let found = E::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(found.map(Into::into))
    }
}
