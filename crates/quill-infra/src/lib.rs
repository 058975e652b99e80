//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! PostgreSQL and in-memory stores, the local auth backend and the cover
//! bucket.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory stores only
//! - `postgres` - PostgreSQL stores via SeaORM
//! - `auth` - JWT + Argon2 local auth backend
//! - `rate-limit` - Attempt limiting via governor
//! - `storage` - Filesystem bucket with signed URLs

pub mod memory;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

#[cfg(feature = "storage")]
pub mod storage;

// Re-exports - In-Memory
pub use memory::{InMemoryPostStore, InMemoryProfileStore, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, PostgresPostStore, PostgresProfileStore, PostgresUserRepository,
};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService, LocalAuthBackend};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "storage")]
pub use storage::{LocalObjectStorage, LocalStorageConfig};
