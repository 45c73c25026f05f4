//! Image optimization interface for the publishing workflow.
//!
//! The publisher needs each local image turned into an upload-ready file
//! with a web-friendly name. Actual binary re-encoding is behind the
//! [`ImageTranscoder`] trait; this crate ships [`CopyTranscoder`], a
//! passthrough implementation that renames and copies without touching
//! pixels. Animated GIFs are always passed through untouched, whatever the
//! implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static SPECIALS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9-]").unwrap());

static HYPHEN_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

static DATE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{8,}").unwrap());

/// Error from image optimization.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TranscodeError {
    #[error("source image not found: {0}")]
    SourceMissing(PathBuf),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Result of optimizing one image.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizedImage {
    /// Upload-ready local file.
    pub path: PathBuf,
    /// Size saved relative to the source, in percent. Zero for passthrough.
    pub size_reduction_percent: f64,
    /// Source dimensions, when the implementation decoded the image.
    pub original_dimensions: Option<(u32, u32)>,
    /// Animated image copied without re-encoding.
    pub animated_passthrough: bool,
}

/// Binary image optimization capability.
///
/// `target_width` is a hint from the note's directive; implementations may
/// downscale to it but must never upscale.
pub trait ImageTranscoder {
    /// Produce an upload-ready file for `source`.
    ///
    /// # Errors
    ///
    /// Returns an error when the source is missing or the output cannot be
    /// written. Per-image failures are expected to be handled by the caller,
    /// which skips the image and continues the document.
    fn optimize(
        &self,
        source: &Path,
        target_width: Option<u32>,
    ) -> Result<OptimizedImage, TranscodeError>;
}

/// Normalize an image filename for the web: lowercase, ASCII-safe, hyphens
/// between words, long digit runs (timestamps, dates) compacted away, and a
/// `.webp` suffix.
///
/// GIFs keep their extension so animation survives.
///
/// # Example
///
/// ```
/// use notepress_images::normalize_filename;
///
/// assert_eq!(
///     normalize_filename("Screen Shot 20240115 (final).png"),
///     "screen-shot-final.webp"
/// );
/// ```
#[must_use]
pub fn normalize_filename(filename: &str) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let is_gif = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));

    let lowered = stem.to_lowercase().replace([' ', '_', '.'], "-");
    let compacted = DATE_RUN_RE.replace_all(&lowered, "");
    let stripped = SPECIALS_RE.replace_all(&compacted, "-");
    let collapsed = HYPHEN_RUN_RE.replace_all(&stripped, "-");
    let slug = collapsed.trim_matches('-');

    let slug = if slug.is_empty() { "image" } else { slug };
    let extension = if is_gif { "gif" } else { "webp" };
    format!("{slug}.{extension}")
}

/// Passthrough transcoder: copies the source into an output directory under
/// its normalized name, no re-encoding.
#[derive(Clone, Debug)]
pub struct CopyTranscoder {
    output_dir: PathBuf,
}

impl CopyTranscoder {
    #[must_use]
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }
}

impl ImageTranscoder for CopyTranscoder {
    fn optimize(
        &self,
        source: &Path,
        _target_width: Option<u32>,
    ) -> Result<OptimizedImage, TranscodeError> {
        if !source.is_file() {
            return Err(TranscodeError::SourceMissing(source.to_path_buf()));
        }

        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .map_or_else(|| "image".to_owned(), normalize_filename);
        // Passthrough keeps the original bytes, so keep the original
        // extension instead of the .webp the normalizer suggests.
        let name = match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let stem = Path::new(&name)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("image")
                    .to_owned();
                format!("{stem}.{}", ext.to_lowercase())
            }
            None => name,
        };

        fs::create_dir_all(&self.output_dir)?;
        let target = self.output_dir.join(&name);
        fs::copy(source, &target)?;
        debug!(source = %source.display(), target = %target.display(), "copied image");

        let animated = source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gif"));

        Ok(OptimizedImage {
            path: target,
            size_reduction_percent: 0.0,
            original_dimensions: None,
            animated_passthrough: animated,
        })
    }
}
