//! The publish workflow: one note in, one live post out.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde_json::json;
use tracing::{info, warn};

use notepress_images::ImageTranscoder;
use notepress_renderer::{
    ArticlePipeline, ImageDirective, Metadata, ResolvedImage, update_image_references,
};

use crate::client::WordPressClient;
use crate::error::{ImageUploadError, PublishError};

/// Outcome of publishing one note.
#[derive(Clone, Debug)]
pub struct PublishReport {
    pub post_id: u64,
    pub url: String,
    pub title: String,
    /// Images optimized and uploaded.
    pub images_uploaded: usize,
    /// Images skipped after a per-image failure.
    pub images_failed: usize,
    pub elapsed: Duration,
    /// `true` when an existing post was updated instead of created.
    pub updated_existing: bool,
}

/// Drives renderer, transcoder and client for one note.
pub struct ArticlePublisher<T: ImageTranscoder> {
    pipeline: ArticlePipeline,
    transcoder: T,
    client: WordPressClient,
}

impl<T: ImageTranscoder> ArticlePublisher<T> {
    pub fn new(pipeline: ArticlePipeline, transcoder: T, client: WordPressClient) -> Self {
        Self {
            pipeline,
            transcoder,
            client,
        }
    }

    /// Publish one note. `publish_live` selects post status `publish` over
    /// `draft`.
    ///
    /// A failure on one image skips that image and keeps going; its directive
    /// text is left unsubstituted in the post body.
    ///
    /// # Errors
    ///
    /// Fatal only when the source document cannot be read or a post-level
    /// API call fails.
    pub fn publish(
        &self,
        doc_path: &Path,
        publish_live: bool,
    ) -> Result<PublishReport, PublishError> {
        let start = Instant::now();

        let article = self.pipeline.process_file(doc_path)?;
        info!(title = article.title, images = article.images.len(), "rendered note");

        let mut resolved = Vec::new();
        let mut failed = 0usize;
        for image in &article.images {
            match self.upload_one(image) {
                Ok(hosted) => resolved.push(hosted),
                Err(err) => {
                    warn!(
                        file = image.raw_filename,
                        "image failed, leaving directive unresolved: {err}"
                    );
                    failed += 1;
                }
            }
        }

        let html = update_image_references(&article.html, &resolved);

        let categories = self.resolve_terms(&article.metadata, "param_category", |name| {
            self.client.get_or_create_category(name)
        })?;
        let tags = self.resolve_terms(&article.metadata, "param_tags", |name| {
            self.client.get_or_create_tag(name)
        })?;

        let guid = article.metadata.str_value("param_guid");
        let created = article
            .metadata
            .str_value("param_created")
            .and_then(normalize_created_date);

        let payload = build_post_payload(
            &article.title,
            &html,
            publish_live,
            created.as_deref(),
            &categories,
            &tags,
            guid,
        );

        let existing = match guid {
            Some(guid) => self.client.find_post_by_guid(guid)?,
            None => None,
        };
        let existing = match existing {
            Some(post) => Some(post),
            None => self.client.find_draft_by_title(&article.title)?,
        };

        let updated_existing = existing.is_some();
        let post = match existing {
            Some(post) => self.client.update_post(post.id, &payload)?,
            None => self.client.create_post(&payload)?,
        };

        Ok(PublishReport {
            post_id: post.id,
            url: post.link,
            title: article.title,
            images_uploaded: resolved.len(),
            images_failed: failed,
            elapsed: start.elapsed(),
            updated_existing,
        })
    }

    /// Optimize and upload one image.
    fn upload_one(&self, image: &ImageDirective) -> Result<ResolvedImage, ImageUploadError> {
        let optimized = self.transcoder.optimize(&image.resolved_path, image.width)?;
        let media = self.client.upload_media(&optimized.path, &image.alt_text)?;
        Ok(ResolvedImage {
            match_span: image.match_span.clone(),
            hosted_url: media.source_url,
            media_id: media.id,
            alt_text: image.alt_text.clone(),
            caption: image.caption.clone(),
            width: image.width,
            local_path: optimized.path,
        })
    }

    /// Resolve a comma-separated metadata field into term ids.
    fn resolve_terms<F>(
        &self,
        metadata: &Metadata,
        key: &str,
        lookup: F,
    ) -> Result<Vec<u64>, PublishError>
    where
        F: Fn(&str) -> Result<crate::types::Term, crate::error::WordPressError>,
    {
        let mut ids = Vec::new();
        for name in metadata.comma_list(key) {
            ids.push(lookup(&name)?.id);
        }
        Ok(ids)
    }
}

/// Normalize a `param_created` date to the REST `date` format.
///
/// Accepts `YYYY-MM-DD`; anything else is logged and dropped so the server
/// assigns the current time.
fn normalize_created_date(value: &str) -> Option<String> {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => Some(format!("{}T00:00:00", date.format("%Y-%m-%d"))),
        Err(_) => {
            warn!(value, "unparseable param_created date, letting the server date the post");
            None
        }
    }
}

/// Assemble the post create/update payload.
fn build_post_payload(
    title: &str,
    html: &str,
    publish_live: bool,
    created: Option<&str>,
    categories: &[u64],
    tags: &[u64],
    guid: Option<&str>,
) -> serde_json::Value {
    let mut payload = json!({
        "title": title,
        "content": html,
        "status": if publish_live { "publish" } else { "draft" },
    });

    if let Some(created) = created {
        payload["date"] = json!(created);
    }
    if !categories.is_empty() {
        payload["categories"] = json!(categories);
    }
    if !tags.is_empty() {
        payload["tags"] = json!(tags);
    }
    if let Some(guid) = guid {
        payload["meta"] = json!({ "obsidian_guid": guid });
    }

    payload
}
