//! In-memory stores - used as fallback when no database is configured.

mod posts;
mod profiles;
mod users;

pub use posts::InMemoryPostStore;
pub use profiles::InMemoryProfileStore;
pub use users::InMemoryUserRepository;
