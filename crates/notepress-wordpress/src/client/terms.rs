//! Category and tag operations for the WordPress API.

use serde_json::json;
use tracing::info;

use super::{WordPressClient, encode_query};
use crate::error::WordPressError;
use crate::types::Term;

/// The two term taxonomies posts are filed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Taxonomy {
    Category,
    Tag,
}

impl Taxonomy {
    fn endpoint(self) -> &'static str {
        match self {
            Self::Category => "categories",
            Self::Tag => "tags",
        }
    }
}

impl WordPressClient {
    /// Look up a category by name, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when creation is rejected.
    pub fn get_or_create_category(&self, name: &str) -> Result<Term, WordPressError> {
        self.get_or_create_term(Taxonomy::Category, name)
    }

    /// Look up a tag by name, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when creation is rejected.
    pub fn get_or_create_tag(&self, name: &str) -> Result<Term, WordPressError> {
        self.get_or_create_term(Taxonomy::Tag, name)
    }

    fn get_or_create_term(&self, taxonomy: Taxonomy, name: &str) -> Result<Term, WordPressError> {
        let url = format!(
            "{}/{}?search={}&per_page=100",
            self.api_url(),
            taxonomy.endpoint(),
            encode_query(name)
        );
        let terms: Vec<Term> = self.get_json(&url)?;

        if let Some(term) = pick_exact_term(terms, name) {
            return Ok(term);
        }

        info!("Creating {} '{}'", taxonomy.endpoint(), name);
        let url = format!("{}/{}", self.api_url(), taxonomy.endpoint());
        self.post_json(&url, &json!({ "name": name }))
    }
}

/// First term whose name matches case-insensitively.
///
/// The REST search is substring-based, so "Rust" would also return
/// "Rustaceans"; only an exact name counts as existing.
fn pick_exact_term(terms: Vec<Term>, name: &str) -> Option<Term> {
    terms
        .into_iter()
        .find(|term| term.name.eq_ignore_ascii_case(name))
}
