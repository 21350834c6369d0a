//! Discovery of embeddable images in an extracted body.

use std::collections::HashSet;

use regex::Regex;

/// Substrings marking decorative assets not worth migrating.
const DECORATIVE_MARKERS: [&str; 3] = ["icon", "btn", "logo"];

/// Collect `<img src>` URLs from body HTML, in document order.
///
/// Deduplicates by exact URL string and skips decorative assets
/// (icon/btn/logo) and inline `data:` URIs.
pub fn discover_images(body_html: &str) -> Vec<String> {
    let img = Regex::new(r#"(?i)<img[^>]+src="([^"]+)"[^>]*>"#).unwrap();

    let mut seen = HashSet::new();
    let mut images = Vec::new();
    for c in img.captures_iter(body_html) {
        let src = c[1].to_string();
        if src.starts_with("data:") {
            continue;
        }
        if DECORATIVE_MARKERS.iter().any(|m| src.contains(m)) {
            continue;
        }
        if seen.insert(src.clone()) {
            images.push(src);
        }
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_document_order() {
        let html = r#"<img src="http://a/1.jpg"><p>x</p><img src="http://a/2.jpg">"#;
        assert_eq!(discover_images(html), vec!["http://a/1.jpg", "http://a/2.jpg"]);
    }

    #[test]
    fn test_deduplicates_exact_urls() {
        let html = r#"<img src="http://a/1.jpg"><img src="http://a/1.jpg">"#;
        assert_eq!(discover_images(html), vec!["http://a/1.jpg"]);
    }

    #[test]
    fn test_skips_decorative_assets() {
        let html = r#"
            <img src="http://a/logo.png">
            <img src="http://a/icon-close.svg">
            <img src="http://a/btn_next.gif">
            <img src="http://a/photo.jpg">
        "#;
        assert_eq!(discover_images(html), vec!["http://a/photo.jpg"]);
    }

    #[test]
    fn test_skips_data_uris() {
        let html = r#"<img src="data:image/png;base64,AAAA"><img src="http://a/x.jpg">"#;
        assert_eq!(discover_images(html), vec!["http://a/x.jpg"]);
    }

    #[test]
    fn test_empty_body() {
        assert!(discover_images("<p>no images</p>").is_empty());
    }
}
