//! Object-storage collaborator for migrated assets.
//!
//! Uploads are upserts keyed by a freshly randomized path, so concurrent
//! publishes never collide on a write.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretBox};
use std::fmt;
use std::time::Duration;

use crate::error::{StorageError, StorageResult};

/// Per-upload deadline.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(25);

/// A secret string that won't be logged or displayed.
///
/// Wraps `secrecy::SecretBox` so the storage service key never leaks into
/// logs, debug output, or error messages.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret for use in a request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Write-side interface to the storage bucket.
///
/// Implemented by [`SupabaseStorage`] in production and
/// [`MockObjectStore`](crate::testing::MockObjectStore) in tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upsert an object and return its public URL.
    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<String>;

    /// Hostname public URLs are served from, for re-migration exclusion.
    fn public_host(&self) -> &str;
}

/// Supabase Storage client.
///
/// Writes to `{base}/storage/v1/object/{bucket}/{path}` with bearer +
/// apikey auth and an upsert flag; public reads come from
/// `{base}/storage/v1/object/public/{bucket}/{path}`.
pub struct SupabaseStorage {
    base_url: String,
    bucket: String,
    service_key: SecretString,
    host: String,
    client: reqwest::Client,
}

impl SupabaseStorage {
    /// Create a client for one bucket.
    ///
    /// `base_url` is the project base, e.g. `https://xyz.supabase.co`.
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        service_key: SecretString,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let host = url::Url::parse(&base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        Self {
            base_url,
            bucket: bucket.into(),
            service_key,
            host,
            client: reqwest::Client::new(),
        }
    }
}

impl fmt::Debug for SupabaseStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseStorage")
            .field("base_url", &self.base_url)
            .field("bucket", &self.bucket)
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<String> {
        let endpoint = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(self.service_key.expose())
            .header("apikey", self.service_key.expose())
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .timeout(UPLOAD_TIMEOUT)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Network(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadStatus {
                status: status.as_u16(),
                detail: detail.chars().take(200).collect(),
            });
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        ))
    }

    fn public_host(&self) -> &str {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_not_in_debug() {
        let secret = SecretString::new("service-key-value");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
    }

    #[test]
    fn test_storage_debug_redacts_key() {
        let storage = SupabaseStorage::new(
            "https://xyz.supabase.co/",
            "images",
            SecretString::new("service-key-value"),
        );
        let debug = format!("{:?}", storage);
        assert!(!debug.contains("service-key-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_public_host_from_base_url() {
        let storage = SupabaseStorage::new(
            "https://xyz.supabase.co",
            "images",
            SecretString::new("k"),
        );
        assert_eq!(storage.public_host(), "xyz.supabase.co");
    }
}
