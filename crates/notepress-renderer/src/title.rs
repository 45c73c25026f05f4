//! Document title resolution.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::frontmatter::Metadata;

static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<h1[^>]*>(.*?)</h1>").unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Filename stems that carry no usable title.
const PLACEHOLDER_STEMS: [&str; 3] = ["untitled", "new", "draft"];

/// Resolve a document title, first non-empty source wins:
///
/// 1. The `title` front matter field.
/// 2. The filename stem, words capitalized, unless it is a placeholder
///    (`untitled`, `new`, `draft`).
/// 3. The first `<h1>` of the rendered HTML, tags stripped.
/// 4. The raw filename stem.
/// 5. `"Untitled"`.
#[must_use]
pub fn resolve_title(metadata: &Metadata, doc_path: &Path, html: &str) -> String {
    if let Some(title) = metadata.str_value("title") {
        let title = title.trim();
        if !title.is_empty() {
            return title.to_owned();
        }
    }

    let stem = doc_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    if !stem.is_empty() && !PLACEHOLDER_STEMS.contains(&stem.to_lowercase().as_str()) {
        return titlecase_stem(stem);
    }

    if let Some(caps) = H1_RE.captures(html) {
        let heading = TAG_RE.replace_all(&caps[1], "");
        let heading = heading.trim();
        if !heading.is_empty() {
            return heading.to_owned();
        }
    }

    if !stem.is_empty() {
        return stem.to_owned();
    }

    "Untitled".to_owned()
}

/// Turn a filename stem into a presentable title: separators become spaces,
/// each word gets a leading capital.
fn titlecase_stem(stem: &str) -> String {
    stem.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
