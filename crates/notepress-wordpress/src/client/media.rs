//! Media operations for the WordPress API.

use std::fs;
use std::path::Path;

use rand::RngExt;
use tracing::info;

use super::{WordPressClient, read_response};
use crate::error::WordPressError;
use crate::types::Media;

impl WordPressClient {
    /// Upload a local file to the media library.
    ///
    /// `alt_text` is attached in the same request so no follow-up PATCH is
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, the upload is rejected,
    /// or the response cannot be decoded.
    pub fn upload_media(&self, path: &Path, alt_text: &str) -> Result<Media, WordPressError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin");
        let data = fs::read(path)?;

        info!("Uploading media '{}' ({} bytes)", filename, data.len());

        let url = format!("{}/media", self.api_url());
        let content_type = content_type_for(filename);

        // Build multipart form data manually
        let boundary = format!("----NotepressBoundary{:016x}", rand::rng().random::<u64>());
        let mut body = Vec::new();

        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(&data);
        body.extend_from_slice(b"\r\n");

        if !alt_text.is_empty() {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            body.extend_from_slice(b"Content-Disposition: form-data; name=\"alt_text\"\r\n\r\n");
            body.extend_from_slice(alt_text.as_bytes());
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("Accept", "application/json")
            .send(&body[..])?;

        read_response(response)
    }
}

/// MIME type from the filename extension.
fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
