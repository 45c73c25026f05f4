//! Protected fragment table.
//!
//! Passes that finalize a piece of markup (styled code blocks, resolved image
//! directives) must shield it from later passes and from the generic
//! renderer. Each fragment is swapped for an HTML-comment marker keyed by
//! index; pulldown-cmark passes comments through as raw HTML in both block
//! and inline position, so the marker survives rendering verbatim and is
//! substituted back exactly once at the end of the pipeline.
//!
//! Using an indexed table instead of content-derived sentinels means markers
//! cannot collide with anything the renderer itself emits.

/// Table of finalized fragments awaiting restoration.
#[derive(Debug, Default)]
pub(crate) struct ProtectedFragments {
    payloads: Vec<String>,
}

impl ProtectedFragments {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store a payload and return its marker.
    pub(crate) fn protect(&mut self, payload: String) -> String {
        let marker = marker(self.payloads.len());
        self.payloads.push(payload);
        marker
    }

    /// Number of protected fragments.
    pub(crate) fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Substitute every marker with its stored payload.
    ///
    /// Markers absent from the text are simply skipped; each marker is
    /// replaced at most once per occurrence and payloads are not re-scanned,
    /// so restoration is idempotent.
    pub(crate) fn restore(&self, text: &str) -> String {
        if self.payloads.is_empty() {
            return text.to_owned();
        }

        let mut output = text.to_owned();
        for (index, payload) in self.payloads.iter().enumerate() {
            output = output.replace(&marker(index), payload);
        }
        output
    }
}

/// Marker for fragment `index`.
fn marker(index: usize) -> String {
    format!("<!--notepress:{index}-->")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_protect_and_restore_roundtrip() {
        let mut fragments = ProtectedFragments::new();
        let m0 = fragments.protect("<div>one</div>".to_owned());
        let m1 = fragments.protect("<div>two</div>".to_owned());

        let text = format!("before {m0} middle {m1} after");
        let restored = fragments.restore(&text);
        assert_eq!(restored, "before <div>one</div> middle <div>two</div> after");
    }

    #[test]
    fn test_restore_with_no_fragments_is_identity() {
        let fragments = ProtectedFragments::new();
        assert_eq!(fragments.restore("plain text"), "plain text");
    }

    #[test]
    fn test_markers_are_distinct() {
        let mut fragments = ProtectedFragments::new();
        let m0 = fragments.protect(String::new());
        let m1 = fragments.protect(String::new());
        assert_ne!(m0, m1);
    }

    #[test]
    fn test_repeated_marker_replaces_all_occurrences() {
        let mut fragments = ProtectedFragments::new();
        let m0 = fragments.protect("X".to_owned());
        let text = format!("{m0} and {m0}");
        assert_eq!(fragments.restore(&text), "X and X");
    }

    #[test]
    fn test_marker_is_html_comment() {
        let mut fragments = ProtectedFragments::new();
        let m0 = fragments.protect(String::new());
        assert!(m0.starts_with("<!--"));
        assert!(m0.ends_with("-->"));
    }
}
