//! Integration tests for the full extract -> discover -> migrate -> rewrite
//! pipeline over canned HTML and mock collaborators.

use std::sync::Arc;

use url::Url;

use origin::testing::{MockImageSource, MockObjectStore};
use origin::{DocumentField, ExtractedDocument, ImageMigrator, UrlPolicy};

const PRESS_PAGE: &str = r#"
<html>
<head>
    <title>Something else entirely - Culture Daily</title>
    <meta property="og:title" content="Gallery opens &quot;Spring&quot; exhibition"/>
    <meta property="og:image" content="/uploads/cover.jpg"/>
    <meta property="article:published_time" content="2026-04-02T09:30:00+09:00"/>
    <script type="application/ld+json">{"@type":"NewsArticle","datePublished":"2026-04-01"}</script>
</head>
<body>
    <header><img src="https://press.example.co.kr/assets/logo.png"></header>
    <nav><a href="/home">home</a></nav>
    <article>
        <p>The exhibition opens on April 10.</p>
        <img src="/uploads/hall.jpg">
        <img src="https://cdn.partner.example/photos/artist.jpg">
        <p>Tickets via <a href="ticket.html">the box office</a>.</p>
    </article>
    <footer>(c) Culture Daily</footer>
    <script>analytics();</script>
</body>
</html>
"#;

fn extract_press_page() -> ExtractedDocument {
    let final_url = Url::parse("https://press.example.co.kr/news/2026/0402").unwrap();
    ExtractedDocument::extract(PRESS_PAGE, &final_url)
}

fn jpeg_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0]
}

#[test]
fn extraction_reads_metadata_and_body() {
    let doc = extract_press_page();

    assert_eq!(doc.title, "Gallery opens \"Spring\" exhibition");
    // og meta beats the JSON-LD date
    assert_eq!(doc.published_date, "2026-04-02T09:30:00+09:00");
    assert_eq!(
        doc.thumbnail_url,
        "https://press.example.co.kr/uploads/cover.jpg"
    );
    assert!(doc.missing.is_empty());

    // Chrome and scripts are gone, relative links are absolute
    assert!(!doc.body_html.contains("analytics"));
    assert!(!doc.body_html.contains("<nav>"));
    assert!(doc
        .body_html
        .contains(r#"src="https://press.example.co.kr/uploads/hall.jpg""#));
    assert!(doc
        .body_html
        .contains(r#"href="https://press.example.co.kr/news/2026/ticket.html""#));

    assert!(doc.body_text.contains("The exhibition opens on April 10."));
    assert!(!doc.body_text.contains('<'));
}

#[test]
fn discovery_prepends_thumbnail_and_skips_chrome() {
    let doc = extract_press_page();

    assert_eq!(
        doc.images,
        vec![
            "https://press.example.co.kr/uploads/cover.jpg",
            "https://press.example.co.kr/uploads/hall.jpg",
            "https://cdn.partner.example/photos/artist.jpg",
        ]
    );
}

#[test]
fn extraction_never_fails_on_garbage() {
    let final_url = Url::parse("https://example.com/x").unwrap();
    let doc = ExtractedDocument::extract("%%% not html at all >>>", &final_url);
    assert!(doc.is_missing(DocumentField::Title));
    assert!(doc.is_missing(DocumentField::Body));
    assert!(doc.images.is_empty());
}

#[tokio::test]
async fn publish_pass_migrates_and_rewrites_idempotently() {
    let doc = extract_press_page();

    let source = MockImageSource::new();
    for url in &doc.images {
        source.add_image(url.clone(), jpeg_bytes(), Some("image/jpeg"));
    }
    let store = MockObjectStore::new();
    let migrator = ImageMigrator::new(
        Arc::new(source.clone()),
        Arc::new(store.clone()),
        UrlPolicy::new(),
    );

    let prepared = migrator
        .prepare_publish(&doc.body_html, &doc.thumbnail_url)
        .await;

    // Every external reference now points at storage
    assert!(!prepared.body.contains("press.example.co.kr/uploads/hall.jpg"));
    assert!(!prepared.body.contains("cdn.partner.example"));
    assert!(prepared.thumbnail.starts_with("https://store.test/"));

    // Re-applying the pass to already-rewritten content is a no-op
    let uploads_before = store.uploads().len();
    let again = migrator
        .prepare_publish(&prepared.body, &prepared.thumbnail)
        .await;
    assert_eq!(again.body, prepared.body);
    assert_eq!(again.thumbnail, prepared.thumbnail);
    assert_eq!(store.uploads().len(), uploads_before);
}

#[tokio::test]
async fn publish_pass_survives_total_image_failure() {
    let doc = extract_press_page();

    // No canned images: every fetch fails
    let source = MockImageSource::new();
    let store = MockObjectStore::new();
    let migrator = ImageMigrator::new(
        Arc::new(source),
        Arc::new(store.clone()),
        UrlPolicy::new(),
    );

    let prepared = migrator
        .prepare_publish(&doc.body_html, &doc.thumbnail_url)
        .await;

    // Original URLs are retained; publication is never blocked
    assert_eq!(prepared.body, doc.body_html);
    assert_eq!(prepared.thumbnail, doc.thumbnail_url);
    assert!(store.uploads().is_empty());
}
