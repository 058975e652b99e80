use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::error::DomainError;
use crate::ports::{ObjectStorage, StorageError};

/// Default lifetime of a cover URL: one year.
pub const DEFAULT_COVER_URL_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Result of a cover upload. `signed_url` is what gets stored as `cover_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverUpload {
    pub path: String,
    pub signed_url: String,
}

/// Uploads post cover images into the cover bucket.
pub struct CoverUploader {
    storage: Arc<dyn ObjectStorage>,
    ttl: Duration,
}

impl CoverUploader {
    pub fn new(storage: Arc<dyn ObjectStorage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub async fn upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<CoverUpload, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::validation("cover file is empty"));
        }
        let ext = extension(file_name)
            .ok_or_else(|| DomainError::validation("cover file needs an extension"))?;

        let path = object_name(&ext);
        self.storage
            .upload(&path, bytes, content_type)
            .await
            .map_err(map_storage_error)?;
        let signed_url = self
            .storage
            .create_signed_url(&path, self.ttl)
            .await
            .map_err(map_storage_error)?;

        tracing::info!(path = %path, size = bytes.len(), "Cover uploaded");
        Ok(CoverUpload { path, signed_url })
    }
}

/// `<unix-millis>-<random>.<ext>`
fn object_name(ext: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}.{ext}", Utc::now().timestamp_millis(), &random[..12])
}

fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn map_storage_error(err: StorageError) -> DomainError {
    match err {
        StorageError::InvalidPath(p) => DomainError::validation(format!("invalid path: {p}")),
        StorageError::NotFound(_) => DomainError::NotFound,
        StorageError::InvalidSignature => DomainError::PermissionDenied,
        StorageError::Io(msg) => {
            tracing::error!(error = %msg, "Cover storage failed");
            DomainError::Backend(msg)
        }
    }
}
