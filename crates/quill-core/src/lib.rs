//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Slug normalization, post authorship rules, the post mutation gateway and
//! the admin session gate live here. Storage, auth and object storage are
//! reached only through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, StoreError, StoreErrorCode};
