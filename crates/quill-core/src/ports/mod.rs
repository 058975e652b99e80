//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod rate_limit;
mod repository;
mod storage;

pub use auth::{
    AuthBackend, AuthError, IssuedToken, MIN_PASSWORD_LEN, PasswordService, TokenClaims,
    TokenService,
};
pub use rate_limit::{Attempt, AttemptLimiter, RateLimitError};
pub use repository::{PostStore, ProfileStore, UserRepository};
pub use storage::{ObjectStorage, StorageError, StoredObject};
