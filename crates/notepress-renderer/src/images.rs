//! Image directive extraction and path resolution.
//!
//! Obsidian embeds images with `![[name|caption|width]]`. The filename in a
//! directive is rarely a usable path: vault layouts scatter images across the
//! note's own directory, a shared `assets/images` root, dated inbox folders,
//! and per-note `<stem>_assets` directories. Resolution probes a fixed
//! candidate order and falls back to recursive search; the first existing
//! regular file wins.
//!
//! Unresolvable directives are dropped from the result with a diagnostic.
//! Their original text is left in the body as ordinary unresolved text.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Datelike, Local};
use ignore::WalkBuilder;
use regex::Regex;
use tracing::{debug, warn};

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[\[([^\]]+)\]\]").unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4,}").unwrap());

/// Extensions tried, in order, when a directive names a file without one.
const INFERRED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// One image embed extracted from a note body.
///
/// Only directives that resolved to an existing file are produced; the
/// `match_span` is the exact original directive text, used later to swap in
/// final markup once the image has been uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageDirective {
    /// Filename as written in the directive.
    pub raw_filename: String,
    /// Caption text, possibly empty. May contain literal `|`.
    pub caption: String,
    /// Requested display width in pixels.
    pub width: Option<u32>,
    /// Exact substring of the source that produced this directive.
    pub match_span: String,
    /// Resolved on-disk location.
    pub resolved_path: PathBuf,
    /// Alt text derived from the caption or the filename.
    pub alt_text: String,
}

/// Resolves image directives against a vault layout.
#[derive(Clone, Debug)]
pub struct ImageResolver {
    project_root: PathBuf,
    assets_root: PathBuf,
}

impl ImageResolver {
    /// Resolver rooted at the vault directory. The shared assets root is
    /// `<root>/assets/images`.
    #[must_use]
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            assets_root: project_root.join("assets").join("images"),
        }
    }

    /// Extract all resolvable image directives from a note body.
    ///
    /// `doc_path` is the note's own location; its directory anchors the
    /// first candidate and its stem names the `<stem>_assets` sibling.
    #[must_use]
    pub fn extract_images(&self, body: &str, doc_path: &Path) -> Vec<ImageDirective> {
        let doc_dir = doc_path.parent().unwrap_or(Path::new(""));
        let doc_stem = doc_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let mut directives = Vec::new();
        for caps in DIRECTIVE_RE.captures_iter(body) {
            let (raw_filename, caption, width) = parse_directive_parts(&caps[1]);

            let Some(resolved_path) = self.resolve(&raw_filename, doc_dir, doc_stem) else {
                warn!(
                    directive = &caps[0],
                    doc = %doc_path.display(),
                    "image not found, leaving directive text as-is"
                );
                continue;
            };
            debug!(file = raw_filename, path = %resolved_path.display(), "resolved image");

            let alt_text = derive_alt_text(&caption, &raw_filename);
            directives.push(ImageDirective {
                raw_filename,
                caption,
                width,
                match_span: caps[0].to_owned(),
                resolved_path,
                alt_text,
            });
        }
        directives
    }

    /// Probe candidate locations for `raw_filename`, first hit wins.
    fn resolve(&self, raw_filename: &str, doc_dir: &Path, doc_stem: &str) -> Option<PathBuf> {
        if let Some(path) = self.probe_literal(raw_filename, doc_dir, doc_stem) {
            return Some(path);
        }

        // Extension inference only applies to extension-less names.
        if Path::new(raw_filename).extension().is_none() {
            for ext in INFERRED_EXTENSIONS {
                let candidate = format!("{raw_filename}.{ext}");
                if let Some(path) = self.probe_literal(&candidate, doc_dir, doc_stem) {
                    return Some(path);
                }
            }
        }

        let name_only = Path::new(raw_filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(raw_filename);
        find_by_name(&self.assets_root, name_only)
            .or_else(|| find_by_name(&self.project_root, name_only))
    }

    /// The four literal candidates, in declared order.
    fn probe_literal(&self, filename: &str, doc_dir: &Path, doc_stem: &str) -> Option<PathBuf> {
        let now = Local::now();
        let candidates = [
            doc_dir.join(filename),
            self.assets_root.join(filename),
            self.assets_root
                .join(now.year().to_string())
                .join(format!("{:02}", now.month()))
                .join(filename),
            doc_dir.join(format!("{doc_stem}_assets")).join(filename),
        ];
        candidates.into_iter().find(|path| path.is_file())
    }
}

/// Split a directive's inner text into (filename, caption, width).
///
/// The first `|`-delimited token is the filename. A trailing purely-numeric
/// token is the width; everything in between is the caption, rejoined so
/// captions containing literal `|` survive.
fn parse_directive_parts(inner: &str) -> (String, String, Option<u32>) {
    let mut parts: Vec<&str> = inner.split('|').collect();
    let raw_filename = parts.remove(0).trim().to_owned();

    let width = parts
        .last()
        .map(|last| last.trim())
        .filter(|last| !last.is_empty() && last.chars().all(|c| c.is_ascii_digit()))
        .and_then(|last| last.parse::<u32>().ok())
        .filter(|&w| w > 0);
    if width.is_some() {
        parts.pop();
    }

    let caption = parts.join("|").trim().to_owned();
    (raw_filename, caption, width)
}

/// Alt text: tag-stripped caption, else a cleaned filename stem, else
/// `"image"`.
fn derive_alt_text(caption: &str, raw_filename: &str) -> String {
    let stripped = TAG_RE.replace_all(caption, "");
    let stripped = stripped.trim();
    if !stripped.is_empty() {
        return stripped.to_owned();
    }

    let stem = Path::new(raw_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(raw_filename);
    let cleaned = DIGIT_RUN_RE.replace_all(stem, "");
    let cleaned = cleaned
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        "image".to_owned()
    } else {
        cleaned
    }
}

/// Recursive filename search under `root`, skipping VCS metadata and other
/// hidden entries. Ties resolve to the lexicographically first path so the
/// result is stable across platforms.
fn find_by_name(root: &Path, name: &str) -> Option<PathBuf> {
    if !root.is_dir() {
        return None;
    }

    let mut matches = BTreeSet::new();
    for entry in WalkBuilder::new(root).build().flatten() {
        if entry.file_type().is_some_and(|ft| ft.is_file())
            && entry.file_name().to_str() == Some(name)
        {
            matches.insert(entry.into_path());
        }
    }
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"png").unwrap();
    }

    #[test]
    fn test_parse_filename_caption_width() {
        let (file, caption, width) = parse_directive_parts("a.png|Caption|300");
        assert_eq!(file, "a.png");
        assert_eq!(caption, "Caption");
        assert_eq!(width, Some(300));
    }

    #[test]
    fn test_parse_caption_with_embedded_pipe() {
        let (file, caption, width) = parse_directive_parts("a.png|left|right|200");
        assert_eq!(file, "a.png");
        assert_eq!(caption, "left|right");
        assert_eq!(width, Some(200));
    }

    #[test]
    fn test_parse_no_width() {
        let (_, caption, width) = parse_directive_parts("a.png|Just a caption");
        assert_eq!(caption, "Just a caption");
        assert_eq!(width, None);
    }

    #[test]
    fn test_parse_zero_width_rejected() {
        let (_, caption, width) = parse_directive_parts("a.png|cap|0");
        // Zero is not a valid width; the token stays in the caption.
        assert_eq!(width, None);
        assert_eq!(caption, "cap|0");
    }

    #[test]
    fn test_alt_text_prefers_caption_tags_stripped() {
        assert_eq!(derive_alt_text("The <em>big</em> one", "x.png"), "The big one");
    }

    #[test]
    fn test_alt_text_from_filename() {
        assert_eq!(derive_alt_text("", "rust-memory_model.png"), "rust memory model");
    }

    #[test]
    fn test_alt_text_strips_date_runs() {
        assert_eq!(derive_alt_text("", "screenshot-20240115.png"), "screenshot");
    }

    #[test]
    fn test_alt_text_fallback_literal() {
        assert_eq!(derive_alt_text("", "20240115.png"), "image");
    }

    #[test]
    fn test_document_local_copy_preferred_over_assets_root() {
        let vault = TempDir::new().unwrap();
        let root = vault.path();
        touch(&root.join("notes").join("pic.png"));
        touch(&root.join("assets").join("images").join("pic.png"));

        let resolver = ImageResolver::new(root);
        let images = resolver.extract_images("![[pic.png]]", &root.join("notes").join("n.md"));

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].resolved_path, root.join("notes").join("pic.png"));
    }

    #[test]
    fn test_assets_root_candidate() {
        let vault = TempDir::new().unwrap();
        let root = vault.path();
        touch(&root.join("assets").join("images").join("pic.png"));

        let resolver = ImageResolver::new(root);
        let images = resolver.extract_images("![[pic.png]]", &root.join("n.md"));
        assert_eq!(
            images[0].resolved_path,
            root.join("assets").join("images").join("pic.png")
        );
    }

    #[test]
    fn test_dated_inbox_candidate() {
        let vault = TempDir::new().unwrap();
        let root = vault.path();
        let now = Local::now();
        let inbox = root
            .join("assets")
            .join("images")
            .join(now.year().to_string())
            .join(format!("{:02}", now.month()));
        touch(&inbox.join("pic.png"));

        let resolver = ImageResolver::new(root);
        let images = resolver.extract_images("![[pic.png]]", &root.join("n.md"));
        assert_eq!(images[0].resolved_path, inbox.join("pic.png"));
    }

    #[test]
    fn test_note_assets_sibling_candidate() {
        let vault = TempDir::new().unwrap();
        let root = vault.path();
        touch(&root.join("my-note_assets").join("pic.png"));

        let resolver = ImageResolver::new(root);
        let images = resolver.extract_images("![[pic.png]]", &root.join("my-note.md"));
        assert_eq!(
            images[0].resolved_path,
            root.join("my-note_assets").join("pic.png")
        );
    }

    #[test]
    fn test_extension_inference() {
        let vault = TempDir::new().unwrap();
        let root = vault.path();
        touch(&root.join("diagram.webp"));

        let resolver = ImageResolver::new(root);
        let images = resolver.extract_images("![[diagram]]", &root.join("n.md"));
        assert_eq!(images[0].resolved_path, root.join("diagram.webp"));
    }

    #[test]
    fn test_extension_inference_order() {
        let vault = TempDir::new().unwrap();
        let root = vault.path();
        touch(&root.join("diagram.png"));
        touch(&root.join("diagram.gif"));

        let resolver = ImageResolver::new(root);
        let images = resolver.extract_images("![[diagram]]", &root.join("n.md"));
        assert_eq!(images[0].resolved_path, root.join("diagram.png"));
    }

    #[test]
    fn test_recursive_search_fallback() {
        let vault = TempDir::new().unwrap();
        let root = vault.path();
        touch(&root.join("deeply").join("nested").join("dir").join("pic.png"));

        let resolver = ImageResolver::new(root);
        let images = resolver.extract_images("![[pic.png]]", &root.join("n.md"));
        assert_eq!(images.len(), 1);
        assert!(images[0].resolved_path.ends_with("dir/pic.png"));
    }

    #[test]
    fn test_unresolved_directive_dropped() {
        let vault = TempDir::new().unwrap();
        let resolver = ImageResolver::new(vault.path());
        let images = resolver.extract_images("![[missing.png]]", &vault.path().join("n.md"));
        assert!(images.is_empty());
    }

    #[test]
    fn test_match_span_is_exact_source_text() {
        let vault = TempDir::new().unwrap();
        let root = vault.path();
        touch(&root.join("pic.png"));

        let resolver = ImageResolver::new(root);
        let body = "before ![[pic.png|My caption|640]] after";
        let images = resolver.extract_images(body, &root.join("n.md"));
        assert_eq!(images[0].match_span, "![[pic.png|My caption|640]]");
        assert!(body.contains(&images[0].match_span));
    }

    #[test]
    fn test_multiple_directives_in_order() {
        let vault = TempDir::new().unwrap();
        let root = vault.path();
        touch(&root.join("a.png"));
        touch(&root.join("b.png"));

        let resolver = ImageResolver::new(root);
        let images = resolver.extract_images("![[a.png]]\n![[b.png]]", &root.join("n.md"));
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].raw_filename, "a.png");
        assert_eq!(images[1].raw_filename, "b.png");
    }
}
