//! Object storage for post covers.

mod local;
mod signing;

pub use local::{LocalObjectStorage, LocalStorageConfig};
