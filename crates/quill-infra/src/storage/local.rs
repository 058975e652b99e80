//! Filesystem bucket with signed download URLs.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use url::form_urlencoded;

use quill_core::ports::{ObjectStorage, StorageError, StoredObject};

use super::signing::UrlSigner;

/// Local object storage settings.
#[derive(Debug, Clone)]
pub struct LocalStorageConfig {
    /// Directory holding one sub-directory per bucket.
    pub root: PathBuf,
    pub bucket: String,
    /// Prefix for generated URLs, e.g. `http://localhost:8080`.
    pub public_base_url: String,
    pub signing_secret: String,
}

/// One bucket stored as a directory. Objects are served back through
/// `GET /storage/{path}?token=...`.
pub struct LocalObjectStorage {
    dir: PathBuf,
    public_base_url: String,
    signer: UrlSigner,
}

impl LocalObjectStorage {
    pub fn new(config: LocalStorageConfig) -> Self {
        Self {
            dir: config.root.join(&config.bucket),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            signer: UrlSigner::new(&config.bucket, &config.signing_secret),
        }
    }

    /// Map an object path into the bucket directory. Only plain relative
    /// paths are accepted.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let plain = !path.is_empty()
            && !path.contains('\\')
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.dir.join(relative))
    }
}

fn io_error(err: std::io::Error) -> StorageError {
    StorageError::Io(err.to_string())
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&target, bytes).await.map_err(io_error)?;

        tracing::debug!(path, content_type, size = bytes.len(), "Object stored");
        Ok(())
    }

    async fn create_signed_url(&self, path: &str, ttl: Duration) -> Result<String, StorageError> {
        self.resolve(path)?;
        let token = self.signer.sign(path, ttl)?;
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("token", &token)
            .finish();
        Ok(format!("{}/storage/{path}?{query}", self.public_base_url))
    }

    async fn open_signed(&self, path: &str, token: &str) -> Result<StoredObject, StorageError> {
        let target = self.resolve(path)?;
        self.signer.verify(path, token)?;

        let bytes = match tokio::fs::read(&target).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_string()));
            }
            Err(e) => return Err(io_error(e)),
        };
        let content_type = mime_guess::from_path(&target)
            .first_or_octet_stream()
            .to_string();

        Ok(StoredObject {
            bytes,
            content_type,
        })
    }
}
