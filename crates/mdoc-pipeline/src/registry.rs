//! Document registry and cross-reference resolution.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use mdoc_renderer::escape_html;

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());

/// Known documents, filename → title.
///
/// Built by the caller from the document collection and passed to the
/// pipeline as a read-only snapshot for `[[reference]]` resolution.
#[derive(Clone, Debug, Default)]
pub struct DocumentRegistry {
    titles: BTreeMap<String, String>,
}

impl DocumentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document by filename (without extension) and title.
    pub fn insert(&mut self, filename: impl Into<String>, title: impl Into<String>) {
        self.titles.insert(filename.into(), title.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Rewrite `[[reference]]` tokens into links.
    ///
    /// Resolution order: exact filename match first, then
    /// case-insensitive title match. Unresolved references become a
    /// visibly marked span still containing the literal text, never
    /// silently dropped.
    #[must_use]
    pub fn resolve_references(&self, text: &str) -> String {
        REFERENCE_RE
            .replace_all(text, |caps: &Captures<'_>| {
                let reference = &caps[1];

                if let Some(title) = self.titles.get(reference) {
                    return cross_reference_link(reference, title);
                }

                for (filename, title) in &self.titles {
                    if title.eq_ignore_ascii_case(reference) {
                        return cross_reference_link(filename, title);
                    }
                }

                tracing::warn!(reference, "unresolved cross-reference");
                format!(
                    r#"<span class="broken-reference">[[{}]]</span>"#,
                    escape_html(reference)
                )
            })
            .into_owned()
    }
}

fn cross_reference_link(filename: &str, title: &str) -> String {
    format!(
        r#"<a href="/{}" class="cross-reference">{}</a>"#,
        escape_html(filename),
        escape_html(title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> DocumentRegistry {
        let mut registry = DocumentRegistry::new();
        registry.insert("intro", "Introduction");
        registry.insert("setup-guide", "Setup Guide");
        registry
    }

    #[test]
    fn test_filename_match() {
        let out = registry().resolve_references("See [[intro]] for details.");
        assert_eq!(
            out,
            r#"See <a href="/intro" class="cross-reference">Introduction</a> for details."#
        );
    }

    #[test]
    fn test_title_match_case_insensitive() {
        for reference in ["Setup Guide", "setup guide", "SETUP GUIDE"] {
            let out = registry().resolve_references(&format!("Read [[{reference}]]."));
            assert_eq!(
                out,
                r#"Read <a href="/setup-guide" class="cross-reference">Setup Guide</a>."#,
                "failed for [[{reference}]]"
            );
        }
    }

    #[test]
    fn test_broken_reference_keeps_text() {
        let out = registry().resolve_references("See [[missing]].");
        assert_eq!(
            out,
            r#"See <span class="broken-reference">[[missing]]</span>."#
        );
    }

    #[test]
    fn test_filename_beats_title() {
        let mut registry = DocumentRegistry::new();
        registry.insert("guide", "Other");
        registry.insert("other", "Guide");
        // "guide" is an exact filename, so the title match never runs
        let out = registry.resolve_references("[[guide]]");
        assert_eq!(out, r#"<a href="/guide" class="cross-reference">Other</a>"#);
    }

    #[test]
    fn test_multiple_references() {
        let out = registry().resolve_references("[[intro]] and [[missing]]");
        assert!(out.contains("cross-reference"));
        assert!(out.contains("broken-reference"));
    }

    #[test]
    fn test_empty_registry() {
        let out = DocumentRegistry::new().resolve_references("[[anything]]");
        assert!(out.contains("broken-reference"));
    }
}
