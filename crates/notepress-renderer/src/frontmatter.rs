//! YAML front matter parsing.
//!
//! A note may begin with a `---`-delimited YAML block holding structured
//! metadata (`param_category`, `param_tags`, `param_created`, `param_guid`,
//! `title`, ...). Keys are free-form; unknown keys pass through untouched.
//!
//! Parsing is never fatal: a document without front matter, or with a
//! malformed block, yields empty metadata and the body unchanged.

use serde_yaml::Value;
use tracing::{debug, warn};

/// Ordered metadata mapping parsed from a note's front matter.
///
/// Values may be scalars or lists. Convenience accessors cover the
/// comma-separated-string convention used by the publisher.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata(serde_yaml::Mapping);

impl Metadata {
    /// Metadata with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the given key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(Value::from(key))
    }

    /// Raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(Value::from(key))
    }

    /// String value for a key, if the value is a scalar string.
    #[must_use]
    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Split a comma-separated string value into trimmed, non-empty parts.
    ///
    /// This is the convention for `param_category` and `param_tags`.
    #[must_use]
    pub fn comma_list(&self, key: &str) -> Vec<String> {
        self.str_value(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Iterate over string keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().filter_map(Value::as_str)
    }
}

impl From<serde_yaml::Mapping> for Metadata {
    fn from(mapping: serde_yaml::Mapping) -> Self {
        Self(mapping)
    }
}

/// Front matter delimiter line.
const DELIMITER: &str = "---";

/// Split a document into front matter metadata and body.
///
/// The document must begin with `---` on the first line; the block ends at
/// the next `---` line. Documents without a leading delimiter, without a
/// closing delimiter, or with YAML that fails to parse are returned unchanged
/// with empty metadata. Parse failures are logged, never raised.
#[must_use]
pub fn split_front_matter(content: &str) -> (Metadata, &str) {
    let Some(rest) = strip_opening_delimiter(content) else {
        return (Metadata::empty(), content);
    };

    let Some((yaml, body)) = split_at_closing_delimiter(rest) else {
        return (Metadata::empty(), content);
    };

    match serde_yaml::from_str::<serde_yaml::Mapping>(yaml) {
        Ok(mapping) => {
            debug!(keys = mapping.len(), "parsed front matter");
            (Metadata(mapping), body)
        }
        Err(err) => {
            warn!("front matter YAML parse failed: {err}");
            (Metadata::empty(), content)
        }
    }
}

/// Strip the opening `---` line, returning the remainder.
fn strip_opening_delimiter(content: &str) -> Option<&str> {
    let rest = content.strip_prefix(DELIMITER)?;
    // The delimiter must be the whole first line.
    match rest.find('\n') {
        Some(newline) if rest[..newline].trim().is_empty() => Some(&rest[newline + 1..]),
        _ => None,
    }
}

/// Find the closing `---` line and split into (yaml, body).
fn split_at_closing_delimiter(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}
