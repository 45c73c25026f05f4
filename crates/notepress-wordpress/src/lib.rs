//! WordPress REST API client and the publish workflow.
//!
//! [`WordPressClient`] is a sync client for the `wp/v2` REST namespace with
//! application-password Basic auth: media upload, post create/update,
//! category/tag lookup-or-create, and the lookups the publisher needs to
//! decide between updating an existing post and creating a new one.
//!
//! [`ArticlePublisher`] drives the whole flow for one note: render, optimize
//! and upload images (per-image failures are skipped, the document still
//! ships), substitute hosted URLs, then create or update the post.

mod client;
mod error;
mod publisher;
mod types;

pub use client::WordPressClient;
pub use error::{ImageUploadError, PublishError, WordPressError};
pub use publisher::{ArticlePublisher, PublishReport};
pub use types::{Media, Post, Term};
