//! PostgreSQL persistence via SeaORM.

mod connections;
mod errors;
mod postgres_base;
pub mod postgres_repo;

pub mod entity;

pub use connections::DatabaseConfig;
pub use postgres_base::PostgresStore;
pub use postgres_repo::{PostgresPostStore, PostgresProfileStore, PostgresUserRepository};
