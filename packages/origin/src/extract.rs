//! Heuristic field extraction from origin-page HTML.
//!
//! Each field has an ordered list of strategies composed first-match-wins,
//! so every heuristic stays unit-testable on its own. Press sites rarely
//! agree on markup; the cascade degrades from structured metadata (Open
//! Graph, JSON-LD) down to tag-soup guessing. Extraction never fails: a
//! field with no matching strategy is simply absent.

use regex::{Captures, Regex};
use url::Url;

/// A field strategy: returns the extracted value or `None` to fall through.
type Strategy = fn(&str) -> Option<String>;

fn first_match(html: &str, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|s| s(html))
}

/// Decode the HTML entities that show up in practice: the common named set
/// plus numeric (`&#NNN;`) and hex (`&#xHH;`) references.
pub fn decode_entities(text: &str) -> String {
    let text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ");

    let dec = Regex::new(r"&#(\d+);").unwrap();
    let text = dec.replace_all(&text, |c: &Captures| {
        c[1].parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    let hex = Regex::new(r"&#x([0-9a-fA-F]+);").unwrap();
    hex.replace_all(&text, |c: &Captures| {
        u32::from_str_radix(&c[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    })
    .into_owned()
}

/// Content of a `<meta>` tag matched by attribute key/value, handling both
/// attribute orders (`property=... content=...` and the reverse).
fn meta_content(html: &str, key: &str, value: &str) -> Option<String> {
    let value = regex::escape(value);
    let forward = Regex::new(&format!(
        r#"(?i)<meta[^>]+{key}="{value}"[^>]+content="([^"]+)""#
    ))
    .unwrap();
    if let Some(c) = forward.captures(html) {
        return Some(c[1].trim().to_string());
    }
    let reversed = Regex::new(&format!(
        r#"(?i)<meta[^>]+content="([^"]+)"[^>]+{key}="{value}""#
    ))
    .unwrap();
    reversed.captures(html).map(|c| c[1].trim().to_string())
}

fn strip_tags(fragment: &str) -> String {
    Regex::new(r"<[^>]+>")
        .unwrap()
        .replace_all(fragment, "")
        .into_owned()
}

// --- Title -----------------------------------------------------------------

fn title_from_og(html: &str) -> Option<String> {
    meta_content(html, "property", "og:title").map(|t| decode_entities(&t))
}

fn title_from_h1(html: &str) -> Option<String> {
    let h1 = Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap();
    let inner = h1.captures(html)?;
    let text = decode_entities(strip_tags(&inner[1]).trim());
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn title_from_title_tag(html: &str) -> Option<String> {
    let tag = Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").unwrap();
    let raw = tag.captures(html)?[1].to_string();
    // Site names ride along after a separator: "Headline - Daily News".
    // Everything from the first dash/pipe is dropped.
    let suffix = Regex::new(r"(?s)\s*[-|]\s*.*$").unwrap();
    let text = decode_entities(suffix.replace(raw.trim(), "").trim());
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Extract the article title: `og:title` meta, then the first `<h1>`, then
/// the `<title>` tag with any site-name suffix stripped.
pub fn extract_title(html: &str) -> Option<String> {
    first_match(html, &[title_from_og, title_from_h1, title_from_title_tag])
}

// --- Published date --------------------------------------------------------

fn date_from_published_time(html: &str) -> Option<String> {
    meta_content(html, "property", "article:published_time")
}

fn date_from_json_ld(html: &str) -> Option<String> {
    let block = Regex::new(r#"(?is)<script[^>]+type="application/ld\+json"[^>]*>(.*?)</script>"#)
        .unwrap();
    let date = Regex::new(r#""datePublished"\s*:\s*"([^"]+)""#).unwrap();
    for script in block.captures_iter(html) {
        if let Some(c) = date.captures(&script[1]) {
            return Some(c[1].to_string());
        }
    }
    None
}

fn date_from_named_meta(html: &str) -> Option<String> {
    let meta = Regex::new(
        r#"(?i)<meta[^>]+name="(?:date|pubdate|publishdate|publish_date)"[^>]+content="([^"]+)""#,
    )
    .unwrap();
    meta.captures(html).map(|c| c[1].trim().to_string())
}

/// Extract the published date: `article:published_time` meta, then
/// `datePublished` from any JSON-LD block, then the date-ish named metas.
///
/// The value is passed through as the site wrote it; callers normalize.
pub fn extract_date(html: &str) -> Option<String> {
    first_match(
        html,
        &[date_from_published_time, date_from_json_ld, date_from_named_meta],
    )
}

// --- Thumbnail -------------------------------------------------------------

/// Extract the `og:image` thumbnail, resolved to an absolute URL.
pub fn extract_thumbnail(html: &str, base: &Url) -> Option<String> {
    let raw = meta_content(html, "property", "og:image")?;
    if raw.starts_with("http") {
        return Some(raw);
    }
    base.join(&raw).ok().map(|u| u.to_string())
}

// --- Body ------------------------------------------------------------------

/// Remove chrome and executable content the article body never needs.
fn strip_noise(html: &str) -> String {
    let mut text = html.to_string();
    for tag in ["script", "style", "nav", "header", "footer", "aside"] {
        let pattern = Regex::new(&format!(r"(?is)<{tag}[\s\S]*?</{tag}>")).unwrap();
        text = pattern.replace_all(&text, "").into_owned();
    }
    text
}

fn body_from_article_tag(html: &str) -> Option<String> {
    let article = Regex::new(r"(?is)<article[^>]*>(.*?)</article>").unwrap();
    article.captures(html).map(|c| c[1].to_string())
}

fn body_from_main_tag(html: &str) -> Option<String> {
    let main = Regex::new(r"(?is)<main[^>]*>(.*?)</main>").unwrap();
    main.captures(html).map(|c| c[1].to_string())
}

fn body_from_role_main(html: &str) -> Option<String> {
    let role = Regex::new(r#"(?is)<[^>]+role="main"[^>]*>(.*?)</(?:div|section|main)>"#).unwrap();
    role.captures(html).map(|c| c[1].to_string())
}

fn body_from_content_class(html: &str) -> Option<String> {
    let class = Regex::new(
        r#"(?is)<(?:div|section)[^>]+(?:class|id)="[^"]*(?:article|content|body|text|news|story)[^"]*"[^>]*>(.*?)</(?:div|section)>"#,
    )
    .unwrap();
    class.captures(html).map(|c| c[1].to_string())
}

/// Rewrite relative `src=`/`href=` values against the post-redirect URL so
/// the fragment renders outside its origin. Absolute URLs, fragments, and
/// non-navigational schemes are left alone.
fn absolutize_urls(fragment: &str, base: &Url) -> String {
    let src = Regex::new(r#"(?i)\bsrc="([^"]*)""#).unwrap();
    let text = src.replace_all(fragment, |c: &Captures| {
        let value = &c[1];
        if value.is_empty() || value.starts_with("http") || value.starts_with("data:") {
            return format!(r#"src="{value}""#);
        }
        match base.join(value) {
            Ok(resolved) => format!(r#"src="{resolved}""#),
            Err(_) => format!(r#"src="{value}""#),
        }
    });

    let href = Regex::new(r#"(?i)\bhref="([^"]*)""#).unwrap();
    href.replace_all(&text, |c: &Captures| {
        let value = &c[1];
        if value.is_empty()
            || value.starts_with("http")
            || value.starts_with('#')
            || value.starts_with("mailto:")
            || value.starts_with("tel:")
            || value.starts_with("javascript:")
        {
            return format!(r#"href="{value}""#);
        }
        match base.join(value) {
            Ok(resolved) => format!(r#"href="{resolved}""#),
            Err(_) => format!(r#"href="{value}""#),
        }
    })
    .into_owned()
}

/// Extract the article body HTML.
///
/// After stripping noise tags globally, tries `<article>`, `<main>`, a
/// `role="main"` container, then a class/id heuristic for content-ish
/// wrappers; the whole cleaned document is the last resort. The boolean is
/// `true` when a targeted container matched, `false` for the whole-document
/// fallback (callers surface that as a gap).
pub fn extract_body(html: &str, base: &Url) -> (String, bool) {
    let cleaned = strip_noise(html);

    let fragment = first_match(
        &cleaned,
        &[
            body_from_article_tag,
            body_from_main_tag,
            body_from_role_main,
            body_from_content_class,
        ],
    );
    let matched = fragment.is_some();
    let fragment = fragment.unwrap_or(cleaned);

    (absolutize_urls(&fragment, base).trim().to_string(), matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://news.example.com/press/42").unwrap()
    }

    #[test]
    fn test_title_prefers_og() {
        let html = r#"<meta property="og:title" content="OG Title"/><h1>H1 Title</h1><title>Tag Title</title>"#;
        assert_eq!(extract_title(html), Some("OG Title".to_string()));
    }

    #[test]
    fn test_title_og_reversed_attribute_order() {
        let html = r#"<meta content="OG Title" property="og:title"/>"#;
        assert_eq!(extract_title(html), Some("OG Title".to_string()));
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let html = "<h1>Foo</h1><title>Foo - Site</title>";
        assert_eq!(extract_title(html), Some("Foo".to_string()));
    }

    #[test]
    fn test_title_h1_strips_nested_tags() {
        let html = "<h1><span>Foo</span> Bar</h1>";
        assert_eq!(extract_title(html), Some("Foo Bar".to_string()));
    }

    #[test]
    fn test_title_tag_strips_site_suffix() {
        assert_eq!(
            extract_title("<title>Foo - Site</title>"),
            Some("Foo".to_string())
        );
        assert_eq!(
            extract_title("<title>Foo | Daily News</title>"),
            Some("Foo".to_string())
        );
    }

    #[test]
    fn test_title_decodes_entities() {
        let html = r#"<meta property="og:title" content="Test &amp; Title"/>"#;
        assert_eq!(extract_title(html), Some("Test & Title".to_string()));
    }

    #[test]
    fn test_title_absent() {
        assert_eq!(extract_title("<p>nothing here</p>"), None);
    }

    #[test]
    fn test_date_priority_order() {
        let html = r#"
            <meta property="article:published_time" content="2026-03-01T09:00:00+09:00"/>
            <script type="application/ld+json">{"datePublished": "2026-02-01"}</script>
            <meta name="date" content="2026-01-01"/>
        "#;
        assert_eq!(
            extract_date(html),
            Some("2026-03-01T09:00:00+09:00".to_string())
        );
    }

    #[test]
    fn test_date_json_ld_beats_named_meta() {
        let html = r#"
            <script type="application/ld+json">{"@type":"NewsArticle","datePublished": "2026-02-01"}</script>
            <meta name="pubdate" content="2026-01-01"/>
        "#;
        assert_eq!(extract_date(html), Some("2026-02-01".to_string()));
    }

    #[test]
    fn test_date_named_meta_last() {
        let html = r#"<meta name="publish_date" content="2026-01-01"/>"#;
        assert_eq!(extract_date(html), Some("2026-01-01".to_string()));
    }

    #[test]
    fn test_thumbnail_resolves_relative() {
        let html = r#"<meta property="og:image" content="/img/cover.jpg"/>"#;
        assert_eq!(
            extract_thumbnail(html, &base()),
            Some("https://news.example.com/img/cover.jpg".to_string())
        );
    }

    #[test]
    fn test_thumbnail_absolute_passthrough() {
        let html = r#"<meta property="og:image" content="https://cdn.example.com/a.png"/>"#;
        assert_eq!(
            extract_thumbnail(html, &base()),
            Some("https://cdn.example.com/a.png".to_string())
        );
    }

    #[test]
    fn test_body_prefers_article_tag() {
        let html = r#"
            <nav>menu</nav>
            <article><p>Body text</p></article>
            <main><p>Main text</p></main>
            <footer>foot</footer>
        "#;
        let (body, matched) = extract_body(html, &base());
        assert!(matched);
        assert!(body.contains("Body text"));
        assert!(!body.contains("Main text"));
        assert!(!body.contains("menu"));
    }

    #[test]
    fn test_body_strips_scripts_globally() {
        let html = r#"<article><p>Keep</p><script>alert(1)</script></article>"#;
        let (body, _) = extract_body(html, &base());
        assert!(body.contains("Keep"));
        assert!(!body.contains("alert"));
    }

    #[test]
    fn test_body_content_class_heuristic() {
        let html = r#"<div class="news-story"><p>Heuristic body</p></div>"#;
        let (body, matched) = extract_body(html, &base());
        assert!(matched);
        assert!(body.contains("Heuristic body"));
    }

    #[test]
    fn test_body_whole_document_fallback() {
        let html = "<p>Loose paragraph</p>";
        let (body, matched) = extract_body(html, &base());
        assert!(!matched);
        assert!(body.contains("Loose paragraph"));
    }

    #[test]
    fn test_body_absolutizes_relative_urls() {
        let html = r#"<article><img src="/img/a.jpg"><a href="more.html">more</a></article>"#;
        let (body, _) = extract_body(html, &base());
        assert!(body.contains(r#"src="https://news.example.com/img/a.jpg""#));
        assert!(body.contains(r#"href="https://news.example.com/press/more.html""#));
    }

    #[test]
    fn test_body_leaves_special_hrefs_alone() {
        let html = r##"<article><a href="#top">top</a><a href="mailto:a@b.c">mail</a><a href="tel:123">call</a></article>"##;
        let (body, _) = extract_body(html, &base());
        assert!(body.contains(r##"href="#top""##));
        assert!(body.contains(r#"href="mailto:a@b.c""#));
        assert!(body.contains(r#"href="tel:123""#));
    }

    #[test]
    fn test_decode_numeric_and_hex_entities() {
        assert_eq!(decode_entities("&#72;&#105;"), "Hi");
        assert_eq!(decode_entities("&#x48;&#x69;"), "Hi");
        assert_eq!(decode_entities("A&nbsp;&amp;&nbsp;B"), "A & B");
    }
}
