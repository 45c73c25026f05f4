//! The ordered markup transformation pipeline.
//!
//! Pass order is the contract here. Code fences are styled and protected
//! before any inline pass so fence content is never mistaken for
//! strikethrough or URL syntax; resolved image directives are protected so
//! their exact source spans survive generic rendering; fragment restore runs
//! last, after post-render enhancement.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use pulldown_cmark::{Options, Parser, html};
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::code_style::CodeBlockStyler;
use crate::directive::transform_syntax;
use crate::enhance::{enhance_tables, process_url_cards};
use crate::error::RenderError;
use crate::fence::scan_fences;
use crate::frontmatter::{Metadata, split_front_matter};
use crate::images::{ImageDirective, ImageResolver};
use crate::protect::ProtectedFragments;
use crate::title::resolve_title;

static STRIKETHROUGH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~([^~\n]+)~~").unwrap());

static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(^|\s)(https?://[^\s<>"]+)"#).unwrap());

static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`\n]+`").unwrap());

/// A fully processed note, ready for the publishing collaborator.
#[derive(Clone, Debug)]
pub struct ProcessedArticle {
    /// Parsed front matter.
    pub metadata: Metadata,
    /// Resolved document title.
    pub title: String,
    /// Final HTML. Image directive spans are still present verbatim; the
    /// caller substitutes them via [`update_image_references`] once hosted
    /// URLs exist.
    pub html: String,
    /// Image directives extracted from the body, in document order.
    pub images: Vec<ImageDirective>,
}

/// Drives the fixed pass sequence over one note.
#[derive(Clone, Debug)]
pub struct ArticlePipeline {
    resolver: ImageResolver,
}

impl ArticlePipeline {
    /// Pipeline for notes under `project_root` (the vault directory).
    #[must_use]
    pub fn new(project_root: &Path) -> Self {
        Self {
            resolver: ImageResolver::new(project_root),
        }
    }

    /// Read a note from disk and run the full pass sequence.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Read`] when the file does not exist or is not
    /// UTF-8 readable. This is the pipeline's only fatal condition.
    pub fn process_file(&self, doc_path: &Path) -> Result<ProcessedArticle, RenderError> {
        let text = std::fs::read_to_string(doc_path).map_err(|source| RenderError::Read {
            path: doc_path.to_path_buf(),
            source,
        })?;
        Ok(self.process(&text, doc_path))
    }

    /// Run the full pass sequence on one note's source text.
    ///
    /// Never fails: malformed front matter, unresolved images and unknown
    /// code styles all degrade locally and are logged.
    #[must_use]
    pub fn process(&self, text: &str, doc_path: &Path) -> ProcessedArticle {
        let (metadata, body) = split_front_matter(text);

        // Read-only extraction; the body is not altered yet.
        let images = self.resolver.extract_images(body, doc_path);

        let body = transform_syntax(body);

        let mut fragments = ProtectedFragments::new();
        let body = protect_code_blocks(&body, &mut fragments);
        let body = protect_image_spans(&body, &images, &mut fragments);

        let body = rewrite_strikethrough(&body);
        let body = autolink_bare_urls(&body);

        let rendered = render_markdown(&body);
        let enhanced = process_url_cards(&enhance_tables(&rendered));
        let html = fragments.restore(&enhanced);

        let title = resolve_title(&metadata, doc_path, &html);
        debug!(
            title,
            images = images.len(),
            fragments = fragments.len(),
            "processed note"
        );

        ProcessedArticle {
            metadata,
            title,
            html,
            images,
        }
    }
}

/// Escape HTML-significant characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Style every fenced block and swap it for a protected fragment.
fn protect_code_blocks(body: &str, fragments: &mut ProtectedFragments) -> String {
    let blocks = scan_fences(body);
    if blocks.is_empty() {
        return body.to_owned();
    }

    let mut output = String::with_capacity(body.len());
    let mut cursor = 0;
    for block in blocks {
        output.push_str(&body[cursor..block.start]);
        let styled = CodeBlockStyler::parse(&block.info).render(&block.content);
        let marker = fragments.protect(styled);
        output.push_str(&marker);
        output.push('\n');
        cursor = block.end;
    }
    output.push_str(&body[cursor..]);
    output
}

/// Protect each resolved image directive's source span.
///
/// The payload is the span itself, so the exact directive text reappears in
/// the final HTML for [`update_image_references`] to substitute. All
/// occurrences of a repeated span share one fragment and are replaced
/// identically.
fn protect_image_spans(
    body: &str,
    images: &[ImageDirective],
    fragments: &mut ProtectedFragments,
) -> String {
    let mut output = body.to_owned();
    for image in images {
        if !output.contains(&image.match_span) {
            continue;
        }
        let marker = fragments.protect(image.match_span.clone());
        output = output.replace(&image.match_span, &marker);
    }
    output
}

/// `~~text~~` → `<del>text</del>`. Raw inline HTML passes through the
/// generic renderer untouched.
fn rewrite_strikethrough(body: &str) -> String {
    STRIKETHROUGH_RE
        .replace_all(body, "<del>$1</del>")
        .into_owned()
}

/// Turn bare URLs into markdown links.
///
/// A bare URL sits at line start or after whitespace, which excludes URLs
/// already inside `[label](url)` or `<url>` forms. Inline code spans are
/// swapped out for the duration of the scan so code content is never
/// linkified. Trailing sentence punctuation stays outside the link.
fn autolink_bare_urls(body: &str) -> String {
    let mut spans: Vec<String> = Vec::new();
    let shielded = INLINE_CODE_RE.replace_all(body, |caps: &Captures<'_>| {
        let token = format!("\u{e000}{}\u{e001}", spans.len());
        spans.push(caps[0].to_owned());
        token
    });

    let linked = BARE_URL_RE.replace_all(&shielded, |caps: &Captures<'_>| {
        let url = caps[2].trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
        let trailing = &caps[2][url.len()..];
        format!("{}[{url}]({url}){trailing}", &caps[1])
    });

    let mut output = linked.into_owned();
    for (index, span) in spans.iter().enumerate() {
        output = output.replace(&format!("\u{e000}{index}\u{e001}"), span);
    }
    output
}

/// Generic rendering stage. Tables are the only extension enabled;
/// strikethrough and task lists are handled by this crate's own passes.
fn render_markdown(body: &str) -> String {
    let parser = Parser::new_ext(body, Options::ENABLE_TABLES);
    let mut out = String::with_capacity(body.len() * 2);
    html::push_html(&mut out, parser);
    out
}

/// A hosted image, produced by the upload collaborator for one directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedImage {
    /// The directive span this image replaces.
    pub match_span: String,
    /// Public URL of the uploaded media.
    pub hosted_url: String,
    /// Remote media id.
    pub media_id: u64,
    pub alt_text: String,
    pub caption: String,
    pub width: Option<u32>,
    /// Local path the upload was made from.
    pub local_path: PathBuf,
}

/// Replace each resolved directive span in `html` with final figure markup.
///
/// Spans absent from the text are logged and skipped, never an error.
/// Repeated spans are replaced identically at every occurrence.
#[must_use]
pub fn update_image_references(html: &str, images: &[ResolvedImage]) -> String {
    let mut output = html.to_owned();
    for image in images {
        if !output.contains(&image.match_span) {
            warn!(
                span = image.match_span,
                "directive span not found in rendered HTML, skipping"
            );
            continue;
        }
        output = output.replace(&image.match_span, &render_figure(image));
    }
    output
}

/// Size class from the requested display width.
fn size_class(width: Option<u32>) -> &'static str {
    match width {
        Some(w) if w <= 150 => "size-thumbnail",
        Some(w) if w <= 300 => "size-medium",
        Some(w) if w <= 1024 => "size-large",
        _ => "size-full",
    }
}

fn render_figure(image: &ResolvedImage) -> String {
    let alt = escape_html(&image.alt_text);
    let width_attr = image
        .width
        .map(|w| format!(" width=\"{w}\""))
        .unwrap_or_default();
    let caption = if image.caption.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{}</figcaption>", escape_html(&image.caption))
    };

    format!(
        "<figure class=\"wp-block-image aligncenter {}\" \
         style=\"text-align: center; margin: 2rem auto;\">\
         <img src=\"{}\" alt=\"{alt}\" class=\"wp-image-{}\"{width_attr} \
         style=\"max-width: 100%; height: auto; border-radius: 4px;\">\
         {caption}</figure>",
        size_class(image.width),
        image.hosted_url,
        image.media_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn resolved(span: &str, url: &str, width: Option<u32>) -> ResolvedImage {
        ResolvedImage {
            match_span: span.to_owned(),
            hosted_url: url.to_owned(),
            media_id: 42,
            alt_text: "alt".to_owned(),
            caption: "A caption".to_owned(),
            width,
            local_path: PathBuf::from("local.png"),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(rewrite_strikethrough("a ~~gone~~ b"), "a <del>gone</del> b");
    }

    #[test]
    fn test_strikethrough_does_not_span_lines() {
        let input = "~~one\ntwo~~";
        assert_eq!(rewrite_strikethrough(input), input);
    }

    #[test]
    fn test_autolink_bare_url() {
        assert_eq!(
            autolink_bare_urls("see https://example.com/x today"),
            "see [https://example.com/x](https://example.com/x) today"
        );
    }

    #[test]
    fn test_autolink_keeps_trailing_punctuation_outside() {
        assert_eq!(
            autolink_bare_urls("visit https://example.com."),
            "visit [https://example.com](https://example.com)."
        );
    }

    #[test]
    fn test_autolink_skips_existing_markdown_links() {
        let input = "[docs](https://example.com/docs)";
        assert_eq!(autolink_bare_urls(input), input);
    }

    #[test]
    fn test_autolink_skips_inline_code() {
        let input = "run `curl https://example.com` locally";
        assert_eq!(autolink_bare_urls(input), input);
    }

    #[test]
    fn test_autolink_at_line_start() {
        let out = autolink_bare_urls("https://example.com\n");
        assert_eq!(out, "[https://example.com](https://example.com)\n");
    }

    #[test]
    fn test_process_file_missing_document_is_fatal() {
        let pipeline = ArticlePipeline::new(Path::new("."));
        let err = pipeline.process_file(Path::new("/no/such/note.md")).unwrap_err();
        assert!(matches!(err, RenderError::Read { .. }));
    }

    #[test]
    fn test_process_file_reads_note() {
        let dir = TempDir::new().unwrap();
        let note = dir.path().join("my-note.md");
        fs::write(&note, "# Hi\n").unwrap();

        let pipeline = ArticlePipeline::new(dir.path());
        let article = pipeline.process_file(&note).unwrap();
        assert_eq!(article.title, "My Note");
    }

    #[test]
    fn test_full_pipeline_basic_document() {
        let pipeline = ArticlePipeline::new(Path::new("."));
        let text = "---\ntitle: Post\n---\n# Heading\n\nSome **bold** text.\n";
        let article = pipeline.process(text, Path::new("post.md"));

        assert_eq!(article.title, "Post");
        assert!(article.html.contains("<h1>Heading</h1>"));
        assert!(article.html.contains("<strong>bold</strong>"));
        assert!(article.images.is_empty());
    }

    #[test]
    fn test_code_fence_protected_from_inline_passes() {
        let pipeline = ArticlePipeline::new(Path::new("."));
        let text = "```\n~~not struck~~\nhttps://example.com\n```\n";
        let article = pipeline.process(text, Path::new("n.md"));

        assert!(article.html.contains("~~not struck~~"));
        assert!(!article.html.contains("<del>"));
        assert!(!article.html.contains("<a href=\"https://example.com\""));
    }

    #[test]
    fn test_styled_fence_survives_rendering() {
        let pipeline = ArticlePipeline::new(Path::new("."));
        let text = "```python error:1\nraise\n```\n";
        let article = pipeline.process(text, Path::new("n.md"));

        assert!(article.html.contains("line-error"));
        assert!(article.html.contains("code-block-wrapper"));
        // No leftover markers.
        assert!(!article.html.contains("<!--notepress:"));
    }

    #[test]
    fn test_image_span_survives_to_final_html() {
        let vault = TempDir::new().unwrap();
        let root = vault.path();
        fs::write(root.join("pic.png"), b"png").unwrap();

        let pipeline = ArticlePipeline::new(root);
        let text = "Look:\n\n![[pic.png|Shot|300]]\n";
        let article = pipeline.process(text, &root.join("n.md"));

        assert_eq!(article.images.len(), 1);
        assert!(article.html.contains("![[pic.png|Shot|300]]"));
    }

    #[test]
    fn test_unresolved_directive_left_as_plain_text() {
        let pipeline = ArticlePipeline::new(Path::new("/nonexistent-vault"));
        let article = pipeline.process("![[missing.png]]\n", Path::new("n.md"));

        assert!(article.images.is_empty());
        assert!(article.html.contains("![[missing.png]]"));
    }

    #[test]
    fn test_pipeline_without_protected_content_matches_plain_passes() {
        // With nothing to protect, the fragment machinery is a no-op.
        let body = "Plain ~~struck~~ text with https://example.com link.\n";
        let pipeline = ArticlePipeline::new(Path::new("."));
        let article = pipeline.process(body, Path::new("n.md"));

        let expected = process_url_cards(&enhance_tables(&render_markdown(&autolink_bare_urls(
            &rewrite_strikethrough(body),
        ))));
        assert_eq!(article.html, expected);
    }

    #[test]
    fn test_tables_enhanced() {
        let pipeline = ArticlePipeline::new(Path::new("."));
        let text = "| A | B |\n|---|---|\n| 1 | 2 |\n";
        let article = pipeline.process(text, Path::new("n.md"));
        assert!(article.html.contains("<table style="));
    }

    #[test]
    fn test_wikilinks_rewritten() {
        let pipeline = ArticlePipeline::new(Path::new("."));
        let article = pipeline.process("See [[Other Note|this]].\n", Path::new("n.md"));
        assert!(article.html.contains("<a href=\"/articles/other-note\">this</a>"));
    }

    #[test]
    fn test_update_image_references_replaces_span() {
        let html = "<p>![[pic.png|Shot|300]]</p>";
        let out = update_image_references(html, &[resolved("![[pic.png|Shot|300]]", "https://cdn/x.webp", Some(300))]);

        assert!(out.contains("<figure class=\"wp-block-image aligncenter size-medium\""));
        assert!(out.contains("src=\"https://cdn/x.webp\""));
        assert!(out.contains("wp-image-42"));
        assert!(out.contains("<figcaption>A caption</figcaption>"));
        assert!(!out.contains("![["));
    }

    #[test]
    fn test_update_image_references_missing_span_unchanged() {
        let html = "<p>no directives</p>";
        let out = update_image_references(html, &[resolved("![[gone.png]]", "https://cdn/y", None)]);
        assert_eq!(out, html);
    }

    #[test]
    fn test_update_image_references_repeated_span() {
        let html = "![[p.png]] and ![[p.png]]";
        let out = update_image_references(html, &[resolved("![[p.png]]", "https://cdn/p", None)]);
        assert_eq!(out.matches("<figure").count(), 2);
    }

    #[test]
    fn test_size_classes() {
        assert_eq!(size_class(Some(100)), "size-thumbnail");
        assert_eq!(size_class(Some(300)), "size-medium");
        assert_eq!(size_class(Some(800)), "size-large");
        assert_eq!(size_class(Some(2000)), "size-full");
        assert_eq!(size_class(None), "size-full");
    }
}
