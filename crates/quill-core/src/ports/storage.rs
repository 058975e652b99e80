//! Object storage port, used for post cover images.

use std::time::Duration;

use async_trait::async_trait;

/// A stored object read back through a signed URL.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `path`, replacing any existing object.
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str)
    -> Result<(), StorageError>;

    /// Issue a URL that grants read access to `path` for `ttl`.
    async fn create_signed_url(&self, path: &str, ttl: Duration) -> Result<String, StorageError>;

    /// Read an object after checking the signature issued by `create_signed_url`.
    async fn open_signed(&self, path: &str, token: &str) -> Result<StoredObject, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid or expired signature")]
    InvalidSignature,

    #[error("Storage I/O error: {0}")]
    Io(String),
}
