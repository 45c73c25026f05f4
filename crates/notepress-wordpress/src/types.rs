//! Response types for the `wp/v2` REST namespace.

use serde::Deserialize;

/// A field WordPress serves in `{ "rendered": "..." }` form.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// An uploaded media item.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Media {
    pub id: u64,
    pub source_url: String,
}

/// A post, as returned by create/update/list calls.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: Rendered,
}

/// A category or tag term.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Term {
    pub id: u64,
    pub name: String,
}
