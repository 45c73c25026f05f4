//! Post-render HTML enhancement.
//!
//! Runs after the generic renderer. Two passes: inline presentation styles
//! for tables, and "card" markup for paragraphs whose only content is a bare
//! URL link. Both operate on already well-formed renderer output; neither
//! changes document structure beyond the card rewrite.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static URL_PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<p><a href="(https?://[^"]+)">([^<]+)</a></p>"#).unwrap()
});

const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%; margin: 1.5rem 0;";
const THEAD_STYLE: &str = "background: #f1f5f9;";
const TH_STYLE: &str =
    "border: 1px solid #cbd5e1; padding: 0.75rem 1rem; text-align: left; font-weight: 600;";
const TD_STYLE: &str = "border: 1px solid #cbd5e1; padding: 0.75rem 1rem;";

/// Attach inline presentation styles to bare table elements.
///
/// Only unadorned opening tags are touched; tags that already carry
/// attributes (including ones this pass produced on an earlier run) are left
/// alone, so the pass is idempotent.
#[must_use]
pub fn enhance_tables(html: &str) -> String {
    html.replace("<table>", &format!("<table style=\"{TABLE_STYLE}\">"))
        .replace("<thead>", &format!("<thead style=\"{THEAD_STYLE}\">"))
        .replace("<th>", &format!("<th style=\"{TH_STYLE}\">"))
        .replace("<td>", &format!("<td style=\"{TD_STYLE}\">"))
}

/// Rewrite solitary bare-URL paragraphs into link cards.
///
/// A paragraph qualifies only when the link text equals the URL itself,
/// which is what the autolink pass produces. Links with a real label keep
/// their paragraph form.
#[must_use]
pub fn process_url_cards(html: &str) -> String {
    URL_PARAGRAPH_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let url = &caps[1];
            let text = &caps[2];
            if url != text {
                return caps[0].to_owned();
            }
            render_card(url)
        })
        .into_owned()
}

fn render_card(url: &str) -> String {
    let display = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    format!(
        "<div class=\"url-card\" style=\"border: 1px solid #e2e8f0; border-radius: 8px; \
         padding: 1rem 1.25rem; margin: 1.5rem 0; background: #f8fafc;\">\
         <a href=\"{url}\" style=\"text-decoration: none; display: flex; \
         align-items: center; gap: 0.75rem;\">\
         <span class=\"url-card-icon\" style=\"font-size: 1.25rem;\">🔗</span>\
         <span class=\"url-card-body\">\
         <span class=\"url-card-title\" style=\"display: block; color: #1e293b; \
         font-weight: 600;\">{display}</span>\
         <span class=\"url-card-url\" style=\"display: block; color: #64748b; \
         font-size: 0.85rem;\">{url}</span>\
         </span></a></div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_table_gets_styles() {
        let html = "<table><thead><tr><th>A</th></tr></thead><tr><td>1</td></tr></table>";
        let out = enhance_tables(html);
        assert!(out.contains("<table style=\"border-collapse"));
        assert!(out.contains("<th style="));
        assert!(out.contains("<td style="));
    }

    #[test]
    fn test_enhance_tables_is_idempotent() {
        let once = enhance_tables("<table><td>x</td></table>");
        let twice = enhance_tables(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_bare_url_paragraph_becomes_card() {
        let html = r#"<p><a href="https://example.com/post">https://example.com/post</a></p>"#;
        let out = process_url_cards(html);
        assert!(out.contains("url-card"));
        assert!(out.contains("href=\"https://example.com/post\""));
        assert!(!out.contains("<p>"));
    }

    #[test]
    fn test_labelled_link_paragraph_untouched() {
        let html = r#"<p><a href="https://example.com">read this</a></p>"#;
        assert_eq!(process_url_cards(html), html);
    }

    #[test]
    fn test_card_title_drops_scheme() {
        let out = process_url_cards(
            r#"<p><a href="https://example.com">https://example.com</a></p>"#,
        );
        assert!(out.contains(">example.com</span>"));
    }

    #[test]
    fn test_link_inside_larger_paragraph_untouched() {
        let html = r#"<p>see <a href="https://example.com">https://example.com</a></p>"#;
        assert_eq!(process_url_cards(html), html);
    }
}
