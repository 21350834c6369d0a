//! Asset migration: re-hosting qualifying external images on our own
//! storage and rewriting references.
//!
//! Migration never fails the caller. A broken or slow image host costs at
//! most its own image; the original URL stays in the body and publication
//! proceeds.

use chrono::{Datelike, Utc};
use futures::future::join_all;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::fetch::{ImageSource, MAX_IMAGE_BYTES};
use crate::images::discover_images;
use crate::security::UrlPolicy;
use crate::storage::ObjectStore;

/// Hard cap on migrations per body pass.
pub const MAX_MIGRATIONS_PER_PASS: usize = 10;

/// Result of one body-migration pass.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    /// Body with every successfully migrated URL substituted
    pub body: String,
    /// Original external URL -> migrated public URL; failures are absent
    pub url_map: IndexMap<String, String>,
}

/// Body and thumbnail ready to persist.
#[derive(Debug, Clone)]
pub struct PreparedContent {
    pub body: String,
    pub thumbnail: String,
}

/// Migrates external images into the object store.
pub struct ImageMigrator {
    source: Arc<dyn ImageSource>,
    store: Arc<dyn ObjectStore>,
    policy: UrlPolicy,
}

impl ImageMigrator {
    /// Create a migrator.
    ///
    /// The policy is extended with the store's public host, so URLs we have
    /// already migrated never qualify again; that is what makes a repeat
    /// pass over rewritten HTML a no-op.
    pub fn new(source: Arc<dyn ImageSource>, store: Arc<dyn ObjectStore>, policy: UrlPolicy) -> Self {
        let policy = policy.with_storage_host(store.public_host());
        Self {
            source,
            store,
            policy,
        }
    }

    /// Migrate a single external image. Returns the public URL, or `None`
    /// on any failure; the caller keeps the original URL.
    pub async fn migrate_image(&self, url: &str) -> Option<String> {
        if let Err(e) = self.policy.check_image_url(url) {
            debug!(url = %url, reason = %e, "image not eligible for migration");
            return None;
        }

        let image = match self.source.fetch_image(url).await {
            Ok(image) => image,
            Err(e) => {
                warn!(url = %url, error = %e, "image fetch failed, keeping original URL");
                return None;
            }
        };

        if image.bytes.is_empty() || image.bytes.len() > MAX_IMAGE_BYTES {
            warn!(url = %url, size = image.bytes.len(), "image size out of bounds, keeping original URL");
            return None;
        }

        let mime = resolve_mime(image.mime.as_deref(), url);
        let path = storage_path(extension_for(mime));

        match self.store.put_object(&path, mime, image.bytes).await {
            Ok(public_url) => {
                info!(url = %url, path = %path, "image migrated");
                Some(public_url)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "storage upload failed, keeping original URL");
                None
            }
        }
    }

    /// Migrate every qualifying external image referenced by the body and
    /// substitute the successes.
    ///
    /// Up to [`MAX_MIGRATIONS_PER_PASS`] distinct URLs migrate concurrently;
    /// the rewrite runs only after all of them have settled, so the returned
    /// body reflects one consistent set of replacements.
    pub async fn migrate_body_images(&self, body_html: &str) -> MigrationOutcome {
        let candidates: Vec<String> = discover_images(body_html)
            .into_iter()
            .filter(|u| self.policy.is_external_image_url(u))
            .take(MAX_MIGRATIONS_PER_PASS)
            .collect();

        let results = join_all(
            candidates
                .iter()
                .map(|url| async move { (url.clone(), self.migrate_image(url).await) }),
        )
        .await;

        let url_map: IndexMap<String, String> = results
            .into_iter()
            .filter_map(|(original, migrated)| migrated.map(|m| (original, m)))
            .collect();

        // Plain substring replacement, not regex: source URLs can contain
        // characters that are regex metacharacters or percent-encodings.
        let mut body = body_html.to_string();
        for (original, migrated) in &url_map {
            body = body.replace(original.as_str(), migrated.as_str());
        }

        MigrationOutcome { body, url_map }
    }

    /// Resolve the thumbnail against a body pass: reuse the mapped URL if
    /// the body already migrated it, otherwise migrate it individually if
    /// it qualifies, otherwise keep it unchanged.
    pub async fn resolve_thumbnail(
        &self,
        thumbnail: &str,
        url_map: &IndexMap<String, String>,
    ) -> String {
        if thumbnail.is_empty() {
            return String::new();
        }
        if let Some(migrated) = url_map.get(thumbnail) {
            return migrated.clone();
        }
        if self.policy.is_external_image_url(thumbnail) {
            if let Some(migrated) = self.migrate_image(thumbnail).await {
                return migrated;
            }
        }
        thumbnail.to_string()
    }

    /// Publish-time entry point: one body pass plus thumbnail resolution.
    pub async fn prepare_publish(&self, body: &str, thumbnail: &str) -> PreparedContent {
        let outcome = self.migrate_body_images(body).await;
        let thumbnail = self.resolve_thumbnail(thumbnail, &outcome.url_map).await;
        PreparedContent {
            body: outcome.body,
            thumbnail,
        }
    }
}

const JPEG: &str = "image/jpeg";
const PNG: &str = "image/png";
const GIF: &str = "image/gif";
const WEBP: &str = "image/webp";

/// Pick the stored MIME type: the response header when it names a supported
/// image type, else the URL's file extension, else JPEG.
fn resolve_mime(header: Option<&str>, url: &str) -> &'static str {
    match header {
        Some("image/jpeg") => return JPEG,
        Some("image/png") => return PNG,
        Some("image/gif") => return GIF,
        Some("image/webp") => return WEBP,
        _ => {}
    }
    let lower = url.to_ascii_lowercase();
    if lower.contains(".png") {
        PNG
    } else if lower.contains(".gif") {
        GIF
    } else if lower.contains(".webp") {
        WEBP
    } else {
        JPEG
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        PNG => "png",
        GIF => "gif",
        WEBP => "webp",
        _ => "jpg",
    }
}

/// `{year}/{zero-padded month}/{unix-ms}_{8-char token}.{ext}` - a fresh
/// random path per upload, so concurrent publishes cannot collide.
fn storage_path(ext: &str) -> String {
    let now = Utc::now();
    let token = Uuid::new_v4().simple().to_string();
    format!(
        "{}/{:02}/{}_{}.{}",
        now.year(),
        now.month(),
        now.timestamp_millis(),
        &token[..8],
        ext
    )
}
