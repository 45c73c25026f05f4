//! Error types for the rendering pipeline.
//!
//! Most failure modes in this crate are recoverable by design (malformed
//! front matter, missing images, unknown styles) and are logged rather than
//! surfaced. [`RenderError`] covers the fatal case: a source document the
//! pipeline cannot read at all.

use std::path::PathBuf;

/// Error from the rendering pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The source document could not be read.
    #[error("cannot read document {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
