//! The assembled result of one origin-page extraction.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::extract;
use crate::images::discover_images;
use crate::text::to_plain_text;

/// A field of [`ExtractedDocument`] that can come up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentField {
    Title,
    PublishedDate,
    Thumbnail,
    /// No targeted container matched; the body is the whole cleaned page.
    Body,
}

/// Structured article data pulled out of one fetched origin page.
///
/// Extraction is a pure function of the input HTML and final URL, and it
/// never fails: fields with no matching heuristic default to empty and are
/// listed in [`missing`](Self::missing) so gaps stay observable instead of
/// blending into legitimate empty strings.
///
/// Constructed per request and discarded once the caller has copied out
/// what it needs; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// URL after following redirects
    pub final_url: String,

    /// Article title, or empty
    pub title: String,

    /// Published date as the site wrote it, or empty
    pub published_date: String,

    /// Absolute thumbnail URL, or empty
    pub thumbnail_url: String,

    /// Article body HTML with absolutized links
    pub body_html: String,

    /// Plain-text rendering of the body
    pub body_text: String,

    /// Embeddable image URLs in document order, deduplicated, thumbnail
    /// first; never contains `data:` URIs
    pub images: Vec<String>,

    /// Fields that defaulted to empty
    pub missing: Vec<DocumentField>,
}

impl ExtractedDocument {
    /// Run the full field cascade over one page.
    pub fn extract(html: &str, final_url: &Url) -> Self {
        let mut missing = Vec::new();

        let title = extract::extract_title(html).unwrap_or_else(|| {
            missing.push(DocumentField::Title);
            String::new()
        });
        let published_date = extract::extract_date(html).unwrap_or_else(|| {
            missing.push(DocumentField::PublishedDate);
            String::new()
        });
        let thumbnail_url = extract::extract_thumbnail(html, final_url).unwrap_or_else(|| {
            missing.push(DocumentField::Thumbnail);
            String::new()
        });

        let (body_html, container_matched) = extract::extract_body(html, final_url);
        if !container_matched {
            missing.push(DocumentField::Body);
        }

        let body_text = to_plain_text(&body_html);

        // The thumbnail migrates first, so it leads the image list.
        let mut images = discover_images(&body_html);
        if !thumbnail_url.is_empty() && !images.contains(&thumbnail_url) {
            images.insert(0, thumbnail_url.clone());
        }

        Self {
            final_url: final_url.to_string(),
            title,
            published_date,
            thumbnail_url,
            body_html,
            body_text,
            images,
            missing,
        }
    }

    /// Whether the given field defaulted to empty.
    pub fn is_missing(&self, field: DocumentField) -> bool {
        self.missing.contains(&field)
    }
}
