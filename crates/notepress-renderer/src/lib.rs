//! Obsidian-flavored markdown to publish-ready HTML.
//!
//! This crate implements the markup transformation pipeline used to turn a
//! vault note into HTML suitable for a CMS post body:
//!
//! 1. Front matter is split off and parsed as YAML ([`split_front_matter`]).
//! 2. Image directives (`![[name|caption|width]]`) are extracted and resolved
//!    against the vault layout ([`ImageResolver`]).
//! 3. Wikilinks and checkboxes are rewritten in place ([`transform_syntax`]).
//! 4. Fenced code blocks are rendered by [`CodeBlockStyler`] and shielded from
//!    later passes behind protected-fragment markers.
//! 5. Strikethrough and bare URLs are rewritten.
//! 6. `pulldown-cmark` renders the remaining constructs.
//! 7. Post-render enhancement (tables, URL cards) and fragment restore.
//!
//! The pass order is load-bearing: code fences must be protected before the
//! inline passes, and fragment restore must run after post-render enhancement.
//! [`ArticlePipeline`] owns that ordering.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use notepress_renderer::ArticlePipeline;
//!
//! let pipeline = ArticlePipeline::new(Path::new("."));
//! let article = pipeline.process("# Hello\n\nSome **text**.", Path::new("note.md"));
//! assert_eq!(article.title, "Note");
//! assert!(article.html.contains("<strong>text</strong>"));
//! ```

mod code_style;
mod directive;
mod enhance;
mod error;
mod fence;
mod frontmatter;
mod images;
mod pipeline;
mod protect;
mod title;

pub use code_style::{CodeBlockStyler, LineStyle, parse_line_ranges};
pub use directive::{slugify, transform_syntax};
pub use enhance::{enhance_tables, process_url_cards};
pub use error::RenderError;
pub use frontmatter::{Metadata, split_front_matter};
pub use images::{ImageDirective, ImageResolver};
pub use pipeline::{
    ArticlePipeline, ProcessedArticle, ResolvedImage, escape_html, update_image_references,
};
pub use title::resolve_title;
