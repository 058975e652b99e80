//! SeaORM entities for the `posts`, `profiles` and `users` tables.

pub mod post;
pub mod profile;
pub mod user;
