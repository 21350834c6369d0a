//! Mock implementations for testing the migration path without a network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult, StorageError, StorageResult};
use crate::fetch::{ImageBytes, ImageSource};
use crate::storage::ObjectStore;

/// Mock image source with canned responses per URL.
///
/// Unknown URLs fail with a network error, which is what a dead image host
/// looks like to the migrator.
#[derive(Default)]
pub struct MockImageSource {
    images: Arc<RwLock<HashMap<String, ImageBytes>>>,
    fetch_calls: Arc<RwLock<Vec<String>>>,
}

impl MockImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` with the given content type for `url`.
    pub fn add_image(&self, url: impl Into<String>, bytes: Vec<u8>, mime: Option<&str>) {
        self.images.write().unwrap().insert(
            url.into(),
            ImageBytes {
                bytes,
                mime: mime.map(str::to_string),
            },
        );
    }

    /// Builder form of [`add_image`](Self::add_image).
    pub fn with_image(self, url: impl Into<String>, bytes: Vec<u8>, mime: Option<&str>) -> Self {
        self.add_image(url, bytes, mime);
        self
    }

    /// URLs that were requested, in order.
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.read().unwrap().clone()
    }
}

impl Clone for MockImageSource {
    fn clone(&self) -> Self {
        Self {
            images: Arc::clone(&self.images),
            fetch_calls: Arc::clone(&self.fetch_calls),
        }
    }
}

#[async_trait]
impl ImageSource for MockImageSource {
    async fn fetch_image(&self, url: &str) -> FetchResult<ImageBytes> {
        self.fetch_calls.write().unwrap().push(url.to_string());
        self.images
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| {
                FetchError::Network(Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("no canned image for {url}"),
                )))
            })
    }
}

/// A recorded upload.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub path: String,
    pub content_type: String,
    pub size: usize,
}

/// Mock object store that records uploads and serves deterministic public
/// URLs from `store.test`.
#[derive(Default)]
pub struct MockObjectStore {
    uploads: Arc<RwLock<Vec<StoredObject>>>,
    failing: Arc<RwLock<bool>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail with a 500.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.write().unwrap() = failing;
    }

    /// Everything uploaded so far.
    pub fn uploads(&self) -> Vec<StoredObject> {
        self.uploads.read().unwrap().clone()
    }
}

impl Clone for MockObjectStore {
    fn clone(&self) -> Self {
        Self {
            uploads: Arc::clone(&self.uploads),
            failing: Arc::clone(&self.failing),
        }
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<String> {
        if *self.failing.read().unwrap() {
            return Err(StorageError::UploadStatus {
                status: 500,
                detail: "mock failure".to_string(),
            });
        }
        self.uploads.write().unwrap().push(StoredObject {
            path: path.to_string(),
            content_type: content_type.to_string(),
            size: bytes.len(),
        });
        Ok(format!(
            "https://store.test/storage/v1/object/public/images/{path}"
        ))
    }

    fn public_host(&self) -> &str {
        "store.test"
    }
}
