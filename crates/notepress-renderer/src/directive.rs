//! Wikilink and checkbox rewriting.
//!
//! Obsidian notes link to each other with `[[Page]]` / `[[Page|Label]]` and
//! use `- [ ]` / `- [x]` task markers. Both are rewritten at the text level,
//! before generic rendering: wikilinks become standard markdown links to
//! `/articles/<slug>`, task markers become checkbox glyphs.
//!
//! A leading `!` marks an image directive, which belongs to the image
//! resolver, not this pass. The regex captures that optional `!` and passes
//! such matches through unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!)?\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").unwrap());

static SLUG_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

static SLUG_COLLAPSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_-]+").unwrap());

/// Derive a URL-safe slug from free text.
///
/// Non-word characters are stripped, runs of whitespace, underscores and
/// hyphens collapse to a single hyphen, and the result is lowercased.
///
/// # Example
///
/// ```
/// use notepress_renderer::slugify;
///
/// assert_eq!(slugify("Foo Bar"), "foo-bar");
/// assert_eq!(slugify("Rust's  Async_Story"), "rusts-async-story");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let stripped = SLUG_STRIP_RE.replace_all(text, "");
    let collapsed = SLUG_COLLAPSE_RE.replace_all(stripped.trim(), "-");
    collapsed.to_lowercase()
}

/// Rewrite wikilinks and checkbox markers in a note body.
///
/// `[[Page]]` becomes `[Page](/articles/page)`; `[[Page|Label]]` keeps
/// `Label` as the visible text. Image directives (`![[...]]`) are left for
/// the image resolver. Task markers become `☐` / `☑` glyphs.
#[must_use]
pub fn transform_syntax(body: &str) -> String {
    let linked = WIKILINK_RE.replace_all(body, |caps: &Captures<'_>| {
        if caps.get(1).is_some() {
            // Image directive, not a wikilink.
            return caps[0].to_owned();
        }
        let page = caps[2].trim();
        let label = caps.get(3).map_or(page, |m| m.as_str().trim());
        format!("[{label}](/articles/{})", slugify(page))
    });

    linked.replace("- [ ]", "☐").replace("- [x]", "☑")
}
