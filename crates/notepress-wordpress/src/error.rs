//! Error types for WordPress integration.

/// Error from WordPress API operations.
#[derive(Debug, thiserror::Error)]
pub enum WordPressError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading an upload.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Per-image failure inside the publish loop.
///
/// Never fatal to the document: the publisher logs it, skips the image and
/// keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ImageUploadError {
    /// Image optimization failed.
    #[error("transcode failed")]
    Transcode(#[from] notepress_images::TranscodeError),

    /// Media upload failed.
    #[error("upload failed")]
    WordPress(#[from] WordPressError),
}

/// Error from the publish workflow.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The source document cannot be read. Fatal: there is nothing to ship.
    #[error("render failed")]
    Render(#[from] notepress_renderer::RenderError),

    /// WordPress API failure outside the per-image loop.
    #[error("WordPress API error")]
    WordPress(#[from] WordPressError),
}
