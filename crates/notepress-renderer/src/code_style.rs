//! Styled rendering of fenced code blocks.
//!
//! Implements the Code Styler fence grammar: the info string's first token is
//! the language, and each following `style:ranges` token marks lines with one
//! of a closed set of highlight styles, e.g.
//!
//! ```text
//! ```python error:1-3,5 warning:7
//! ```
//!
//! Style declarations keep their source order; when a line number appears in
//! more than one style's ranges, the first-declared style wins. Unrecognized
//! style names and malformed range tokens are dropped, never fatal. Unknown
//! language names pass through as a CSS hint with no highlighting semantics.

use std::collections::BTreeSet;
use std::fmt::Write;

use tracing::debug;

use crate::pipeline::escape_html;

/// Sentinel language for fences without an info string.
const PLAINTEXT: &str = "plaintext";

/// Line highlight style, in the closed set the fence grammar accepts.
///
/// Presentation data (CSS class, background, border) is attached to the
/// variant so the set stays a single source of truth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Error,
    Warning,
    Success,
    Info,
    Highlight,
    Add,
    Remove,
}

impl LineStyle {
    /// Parse a style name from the info string. Unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "success" => Some(Self::Success),
            "info" => Some(Self::Info),
            "highlight" => Some(Self::Highlight),
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }

    /// CSS class for highlighted lines.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Error => "line-error",
            Self::Warning => "line-warning",
            Self::Success => "line-success",
            Self::Info => "line-info",
            Self::Highlight => "line-highlight",
            Self::Add => "line-add",
            Self::Remove => "line-remove",
        }
    }

    /// Background color for highlighted lines.
    #[must_use]
    pub fn background(self) -> &'static str {
        match self {
            Self::Error => "#fee",
            Self::Warning => "#fffbdd",
            Self::Success => "#e6ffed",
            Self::Info => "#e3f2fd",
            Self::Highlight => "#fff3cd",
            Self::Add => "#e6ffed",
            Self::Remove => "#ffeef0",
        }
    }

    /// Left border for highlighted lines.
    #[must_use]
    pub fn border_left(self) -> &'static str {
        match self {
            Self::Error => "3px solid #f44336",
            Self::Warning => "3px solid #ff9800",
            Self::Success => "3px solid #4caf50",
            Self::Info => "3px solid #2196f3",
            Self::Highlight => "3px solid #ffc107",
            Self::Add => "3px solid #28a745",
            Self::Remove => "3px solid #dc3545",
        }
    }
}

/// Highest line number a range token may address.
const MAX_RANGE_LINE: usize = 10_000;

/// Parse a comma-separated line-range string into a set of line numbers.
///
/// Tokens are `N` or `N-M` (inclusive). Malformed tokens and inverted ranges
/// are dropped silently: `"1-3,5"` → `{1, 2, 3, 5}`, `"2-1"` → `{}`.
/// Range ends are clamped to [`MAX_RANGE_LINE`]; lines past the block's
/// actual length are ignored at render time anyway.
#[must_use]
pub fn parse_line_ranges(ranges: &str) -> BTreeSet<usize> {
    let mut lines = BTreeSet::new();
    for token in ranges.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some((start, end)) = token.split_once('-') {
            if let (Ok(start), Ok(end)) = (start.parse::<usize>(), end.parse::<usize>()) {
                lines.extend(start..=end.min(MAX_RANGE_LINE));
            }
        } else if let Ok(line) = token.parse::<usize>() {
            lines.insert(line);
        }
    }
    lines
}

/// Renders one fenced code block into styled HTML.
///
/// Ephemeral: parse the info string with [`CodeBlockStyler::parse`], render
/// the content with [`CodeBlockStyler::render`], and discard.
#[derive(Clone, Debug)]
pub struct CodeBlockStyler {
    language: String,
    /// Highlight declarations in source order; first-declared wins on overlap.
    highlights: Vec<(LineStyle, BTreeSet<usize>)>,
}

impl CodeBlockStyler {
    /// Parse a fence info string: `lang [style:ranges ...]`.
    ///
    /// A missing language token falls back to the plaintext sentinel.
    /// Tokens with an unrecognized style name are ignored.
    #[must_use]
    pub fn parse(info: &str) -> Self {
        let mut parts = info.split_whitespace();
        let language = parts.next().unwrap_or(PLAINTEXT).to_owned();

        let mut highlights: Vec<(LineStyle, BTreeSet<usize>)> = Vec::new();
        for part in parts {
            let Some((name, ranges)) = part.split_once(':') else {
                continue;
            };
            let Some(style) = LineStyle::from_name(name) else {
                debug!(style = name, "ignoring unknown highlight style");
                continue;
            };
            let lines = parse_line_ranges(ranges);
            if lines.is_empty() {
                continue;
            }
            // Merge repeated declarations of the same style.
            if let Some((_, existing)) = highlights.iter_mut().find(|(s, _)| *s == style) {
                existing.extend(lines);
            } else {
                highlights.push((style, lines));
            }
        }

        Self {
            language,
            highlights,
        }
    }

    /// Language name from the info string (or the plaintext sentinel).
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether any line highlights were declared.
    #[must_use]
    pub fn has_highlights(&self) -> bool {
        !self.highlights.is_empty()
    }

    /// Style for a 1-based line number. First-declared style wins.
    #[must_use]
    pub fn style_for_line(&self, line: usize) -> Option<LineStyle> {
        self.highlights
            .iter()
            .find(|(_, lines)| lines.contains(&line))
            .map(|(style, _)| *style)
    }

    /// Render the block content into final styled HTML.
    ///
    /// Content is HTML-escaped, and a single trailing empty line (the fence
    /// closing artifact) is dropped.
    #[must_use]
    pub fn render(&self, content: &str) -> String {
        let escaped = escape_html(content);
        let mut lines: Vec<&str> = escaped.split('\n').collect();
        if lines.last().is_some_and(|last| last.trim().is_empty()) {
            lines.pop();
        }

        let is_plaintext = self.language == PLAINTEXT;
        if is_plaintext && self.highlights.is_empty() {
            return format!(
                "<div class=\"code-block-wrapper\">\
                 <pre><code class=\"language-plaintext\">{}</code></pre></div>",
                lines.join("\n")
            );
        }

        let tag_language = normalize_language(&self.language);
        let mut body = String::with_capacity(escaped.len() * 2);
        for (index, line) in lines.iter().enumerate() {
            self.render_line(index + 1, line, &mut body);
        }

        self.render_wrapper(&tag_language, &body, is_plaintext)
    }

    /// Render a single line span with its number label.
    fn render_line(&self, number: usize, content: &str, out: &mut String) {
        let label = format!(
            "<span class=\"line-number\" style=\"display: inline-block; width: 3em; \
             color: #999; text-align: right; padding-right: 1em; \
             user-select: none;\">{number}</span>"
        );

        if let Some(style) = self.style_for_line(number) {
            write!(
                out,
                "<span class=\"code-line {}\" style=\"display: block; background: {}; \
                 border-left: {}; padding-left: 1rem; margin-left: -1rem; \
                 margin-right: -1rem; padding-right: 1rem;\">{label}{content}</span>",
                style.css_class(),
                style.background(),
                style.border_left(),
            )
            .unwrap();
        } else {
            write!(
                out,
                "<span class=\"code-line\" style=\"display: block;\">{label}{content}</span>"
            )
            .unwrap();
        }
    }

    /// Wrap rendered lines in the block element, with optional language label.
    fn render_wrapper(&self, tag_language: &str, body: &str, is_plaintext: bool) -> String {
        let pre_style = "background: #1e293b; color: #e2e8f0; padding: 1.5rem; \
             border-radius: 8px; overflow-x: auto; margin: 1.5rem 0; position: relative; \
             font-family: \"Consolas\", \"Monaco\", \"Courier New\", monospace; \
             font-size: 0.9rem; line-height: 1.6;";

        let mut out = String::with_capacity(body.len() + 512);
        out.push_str("<div class=\"code-block-wrapper\">");

        if !is_plaintext {
            write!(
                out,
                "<div class=\"code-language-label\" style=\"position: absolute; \
                 top: 0; right: 0; background: rgba(255,255,255,0.1); \
                 padding: 0.25rem 0.75rem; border-radius: 0 8px 0 8px; \
                 font-size: 0.75rem; color: #94a3b8; text-transform: uppercase;\">{}</div>",
                escape_html(&self.language)
            )
            .unwrap();
        }

        if self.has_highlights() {
            out.push_str(
                "<style>.code-line:hover .line-number { color: #e2e8f0 !important; }</style>",
            );
        }

        write!(
            out,
            "<pre class=\"language-{tag_language}\" style=\"{pre_style}\">\
             <code class=\"language-{tag_language}\" style=\"display: block; padding: 0;\">\
             {body}</code></pre></div>"
        )
        .unwrap();

        out
    }
}

/// Map language aliases to the canonical names the syntax highlighter expects.
///
/// Unknown names pass through unchanged (lowercased) — they are a CSS hint,
/// not an error.
fn normalize_language(language: &str) -> String {
    let lower = language.to_lowercase();
    let canonical = match lower.as_str() {
        "py" => "python",
        "js" => "javascript",
        "ts" => "typescript",
        "rs" => "rust",
        "rb" => "ruby",
        "cs" => "csharp",
        "c++" => "cpp",
        "sh" | "shell" => "bash",
        "ps1" => "powershell",
        "yml" => "yaml",
        "md" => "markdown",
        "docker" => "dockerfile",
        "text" | "txt" => "plaintext",
        other => other,
    };
    canonical.to_owned()
}
