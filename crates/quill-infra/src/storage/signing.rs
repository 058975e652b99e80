//! Signed download tokens for stored objects.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use quill_core::ports::StorageError;

#[derive(Debug, Serialize, Deserialize)]
struct ObjectClaims {
    bucket: String,
    path: String,
    exp: i64,
}

/// HS256 signer binding a token to one object path until expiry.
pub struct UrlSigner {
    bucket: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl UrlSigner {
    pub fn new(bucket: &str, secret: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, path: &str, ttl: Duration) -> Result<String, StorageError> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX / 2);
        let claims = ObjectClaims {
            bucket: self.bucket.clone(),
            path: path.to_string(),
            exp: Utc::now().timestamp().saturating_add(ttl_secs),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    pub fn verify(&self, path: &str, token: &str) -> Result<(), StorageError> {
        let claims = decode::<ObjectClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| StorageError::InvalidSignature)?
            .claims;

        if claims.path != path || claims.bucket != self.bucket {
            return Err(StorageError::InvalidSignature);
        }
        Ok(())
    }
}
