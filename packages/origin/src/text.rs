//! Deterministic HTML-to-text conversion for previews and length-capped
//! contexts.

use regex::Regex;

/// Render extracted body HTML as plain text.
///
/// `<br>` becomes a newline, closing `</p>` a paragraph break, closing
/// `</div>`/`</li>` a line break; every remaining tag is stripped, common
/// entities decoded, and runs of three or more newlines collapsed to two.
pub fn to_plain_text(html: &str) -> String {
    let br = Regex::new(r"(?i)<br\s*/?>").unwrap();
    let text = br.replace_all(html, "\n");

    let p_close = Regex::new(r"(?i)</p>").unwrap();
    let text = p_close.replace_all(&text, "\n\n");

    let line_close = Regex::new(r"(?i)</(?:div|li)>").unwrap();
    let text = line_close.replace_all(&text, "\n");

    let tags = Regex::new(r"<[^>]+>").unwrap();
    let text = tags.replace_all(&text, "");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let squeeze = Regex::new(r"\n{3,}").unwrap();
    squeeze.replace_all(&text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_become_blank_lines() {
        assert_eq!(to_plain_text("<p>A</p><p>B</p>"), "A\n\nB");
    }

    #[test]
    fn test_br_becomes_newline() {
        assert_eq!(to_plain_text("A<br>B<br/>C"), "A\nB\nC");
    }

    #[test]
    fn test_no_residual_tags() {
        let out = to_plain_text(r#"<div><span class="x">A</span></div><li>B</li>"#);
        assert!(!out.contains('<'));
        assert_eq!(out, "A\nB");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(to_plain_text("<p>A &amp; B&nbsp;C</p>"), "A & B C");
    }

    #[test]
    fn test_newline_runs_collapse() {
        assert_eq!(to_plain_text("<p>A</p><br><br><p>B</p>"), "A\n\nB");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(to_plain_text("<p></p><p>A</p><br>"), "A");
    }
}
