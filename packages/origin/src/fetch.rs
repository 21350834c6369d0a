//! Remote fetching for origin pages and embedded images.
//!
//! All fetches are gated by [`UrlPolicy`] and carry realistic browser-ish
//! headers, since many Korean press hosts reject obvious bot traffic.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::security::UrlPolicy;

/// Per-page fetch deadline.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(12);

/// Per-image fetch deadline.
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum accepted image payload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const PAGE_USER_AGENT: &str = "Mozilla/5.0 (compatible; PressroomBot/1.0)";
const IMAGE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// An origin page after redirects, with the post-redirect URL retained for
/// relative-link resolution.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Raw HTML body
    pub html: String,
    /// URL after following redirects
    pub final_url: Url,
}

/// Raw image bytes plus the upstream content type, if any.
#[derive(Debug, Clone)]
pub struct ImageBytes {
    pub bytes: Vec<u8>,
    /// `Content-Type` header value, stripped of parameters
    pub mime: Option<String>,
}

/// Source of image bytes for the asset migrator.
///
/// The HTTP implementation lives on [`OriginFetcher`]; tests use
/// [`MockImageSource`](crate::testing::MockImageSource).
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, url: &str) -> FetchResult<ImageBytes>;
}

/// HTTP fetcher for third-party origin pages and images.
pub struct OriginFetcher {
    client: reqwest::Client,
    policy: UrlPolicy,
}

impl OriginFetcher {
    /// Create a fetcher gated by the given policy.
    pub fn new(policy: UrlPolicy) -> Self {
        Self {
            // Redirects are followed (reqwest default); per-request timeouts
            // are set below since pages and images have different deadlines.
            client: reqwest::Client::new(),
            policy,
        }
    }

    /// The safety policy this fetcher enforces.
    pub fn policy(&self) -> &UrlPolicy {
        &self.policy
    }

    /// Fetch an origin page as HTML, following redirects.
    ///
    /// Validates the URL against the safety gate, the response status, and
    /// that the content type is HTML.
    pub async fn fetch_page(&self, url: &str) -> FetchResult<FetchedPage> {
        self.policy.check_page_url(url)?;

        debug!(url = %url, "origin page fetch starting");
        let response = self
            .client
            .get(url)
            .header("User-Agent", PAGE_USER_AGENT)
            .header("Accept", "text/html,application/xhtml+xml,*/*")
            .header("Accept-Language", "ko-KR,ko;q=0.9,en;q=0.8")
            .timeout(PAGE_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.contains("html") {
            return Err(FetchError::UnsupportedContentType { content_type });
        }

        // Capture final URL after redirects for relative-link resolution
        let final_url = response.url().clone();

        let html = response.text().await.map_err(|e| classify(e, url))?;

        Ok(FetchedPage { html, final_url })
    }

    async fn fetch_image_inner(&self, url: &str) -> FetchResult<ImageBytes> {
        let parsed = self.policy.check_image_url(url)?;

        // Many image hosts check the referer; claim to come from their own
        // origin.
        let referer = format!("{}/", parsed.origin().ascii_serialization());

        debug!(url = %url, "image fetch starting");
        let response = self
            .client
            .get(url)
            .header("User-Agent", IMAGE_USER_AGENT)
            .header("Referer", referer)
            .header("Accept", "image/webp,image/apng,image/*,*/*;q=0.8")
            .timeout(IMAGE_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mime = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.split(';').next().unwrap_or("").trim().to_string())
            .filter(|ct| !ct.is_empty());

        let bytes = response.bytes().await.map_err(|e| classify(e, url))?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(FetchError::TooLarge {
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }

        Ok(ImageBytes {
            bytes: bytes.to_vec(),
            mime,
        })
    }
}

#[async_trait]
impl ImageSource for OriginFetcher {
    async fn fetch_image(&self, url: &str) -> FetchResult<ImageBytes> {
        self.fetch_image_inner(url).await.map_err(|e| {
            warn!(url = %url, error = %e, "image fetch failed");
            e
        })
    }
}

/// Map a reqwest failure onto the fetch taxonomy.
fn classify(err: reqwest::Error, url: &str) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network(Box::new(err))
    }
}
