//! Post-pass that assigns ids to headings missing one.
//!
//! Headings produced from markdown already carry slug ids. Documents can
//! also contain raw HTML headings, which arrive without ids; this pass
//! gives them the same slug treatment so the table of contents and
//! fragment links work uniformly.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::state::slugify;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h([1-6])([^>]*)>(.*?)</h[1-6]>").unwrap());

static ID_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bid\s*=\s*"([^"]*)""#).unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Add slug ids to headings that lack one.
///
/// Existing ids are left untouched and count towards duplicate
/// disambiguation, so a raw `<h2>FAQ</h2>` after a markdown `## FAQ`
/// becomes `<h2 id="faq-1">`.
#[must_use]
pub fn add_heading_ids(html: &str) -> String {
    // Seed duplicate counts with ids already present on headings.
    let mut id_counts: HashMap<String, usize> = HashMap::new();
    for caps in HEADING_RE.captures_iter(html) {
        if let Some(id_caps) = ID_ATTR_RE.captures(&caps[2]) {
            *id_counts.entry(id_caps[1].to_owned()).or_default() += 1;
        }
    }

    HEADING_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let (level, attrs, inner) = (&caps[1], &caps[2], &caps[3]);
            if ID_ATTR_RE.is_match(attrs) {
                return caps[0].to_owned();
            }

            let text = TAG_RE.replace_all(inner, "");
            let base_id = slugify(&text);
            let count = id_counts.entry(base_id.clone()).or_default();
            let id = match *count {
                0 => base_id,
                n => format!("{base_id}-{n}"),
            };
            *count += 1;

            format!(r#"<h{level} id="{id}"{attrs}>{inner}</h{level}>"#)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_adds_id_to_raw_heading() {
        let html = "<h2>Getting Started</h2>";
        assert_eq!(
            add_heading_ids(html),
            r#"<h2 id="getting-started">Getting Started</h2>"#
        );
    }

    #[test]
    fn test_keeps_existing_id() {
        let html = r#"<h2 id="custom">Getting Started</h2>"#;
        assert_eq!(add_heading_ids(html), html);
    }

    #[test]
    fn test_preserves_other_attributes() {
        let html = r#"<h3 class="fancy">Setup</h3>"#;
        assert_eq!(
            add_heading_ids(html),
            r##"<h3 id="setup" class="fancy">Setup</h3>"##
        );
    }

    #[test]
    fn test_strips_inline_tags_for_slug() {
        let html = "<h2>Install <code>npm</code></h2>";
        let result = add_heading_ids(html);
        assert!(result.contains(r#"id="install-npm""#));
        assert!(result.contains("<code>npm</code>"));
    }

    #[test]
    fn test_duplicate_headings_disambiguated() {
        let html = "<h2>FAQ</h2><h2>FAQ</h2>";
        let result = add_heading_ids(html);
        assert!(result.contains(r#"<h2 id="faq">"#));
        assert!(result.contains(r#"<h2 id="faq-1">"#));
    }

    #[test]
    fn test_existing_id_counts_for_disambiguation() {
        let html = r#"<h2 id="faq">FAQ</h2><h2>FAQ</h2>"#;
        let result = add_heading_ids(html);
        assert!(result.contains(r#"<h2 id="faq">"#));
        assert!(result.contains(r#"<h2 id="faq-1">"#));
    }

    #[test]
    fn test_non_heading_content_untouched() {
        let html = "<p>Not a heading</p>";
        assert_eq!(add_heading_ids(html), html);
    }
}
