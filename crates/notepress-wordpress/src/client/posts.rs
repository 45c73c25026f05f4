//! Post operations for the WordPress API.

use tracing::info;

use super::{WordPressClient, encode_query};
use crate::error::WordPressError;
use crate::types::Post;

impl WordPressClient {
    /// Create a new post from a prepared payload.
    ///
    /// # Errors
    ///
    /// Returns an error when the server rejects the payload.
    pub fn create_post(&self, payload: &serde_json::Value) -> Result<Post, WordPressError> {
        let url = format!("{}/posts", self.api_url());
        let post: Post = self.post_json(&url, payload)?;
        info!("Created post {} ({})", post.id, post.link);
        Ok(post)
    }

    /// Update an existing post.
    ///
    /// # Errors
    ///
    /// Returns an error when the post does not exist or the payload is
    /// rejected.
    pub fn update_post(
        &self,
        post_id: u64,
        payload: &serde_json::Value,
    ) -> Result<Post, WordPressError> {
        let url = format!("{}/posts/{post_id}", self.api_url());
        let post: Post = self.post_json(&url, payload)?;
        info!("Updated post {} ({})", post.id, post.link);
        Ok(post)
    }

    /// Find a post carrying the given note guid in its meta, any status.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or decode failure; no match is `Ok(None)`.
    pub fn find_post_by_guid(&self, guid: &str) -> Result<Option<Post>, WordPressError> {
        let url = format!(
            "{}/posts?status=any&meta_key=obsidian_guid&meta_value={}&per_page=1",
            self.api_url(),
            encode_query(guid)
        );
        let posts: Vec<Post> = self.get_json(&url)?;
        Ok(posts.into_iter().next())
    }

    /// Find a draft whose title matches exactly.
    ///
    /// The REST search is fuzzy, so candidates are filtered to an exact
    /// rendered-title match.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or decode failure; no match is `Ok(None)`.
    pub fn find_draft_by_title(&self, title: &str) -> Result<Option<Post>, WordPressError> {
        let url = format!(
            "{}/posts?status=draft&search={}&per_page=20",
            self.api_url(),
            encode_query(title)
        );
        let posts: Vec<Post> = self.get_json(&url)?;
        Ok(pick_exact_title(posts, title))
    }
}

/// First post whose rendered title equals `title`.
fn pick_exact_title(posts: Vec<Post>, title: &str) -> Option<Post> {
    posts.into_iter().find(|post| post.title.rendered == title)
}
