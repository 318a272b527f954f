//! Post-pass that marks external links.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<a href="([^"]*)"([^>]*)>(.*?)</a>"#).unwrap());

/// Rewrite absolute `http(s)` anchors to open in a new tab.
///
/// Adds `target="_blank"`, `rel="noopener noreferrer"` and the
/// `external-link-button` class so the frontend can style them. Each
/// attribute is only added when the author did not already supply one.
/// Site-relative and fragment links are left alone.
#[must_use]
pub fn enhance_external_links(html: &str) -> String {
    ANCHOR_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let (href, content) = (&caps[1], &caps[3]);
            let mut rest = caps[2].to_owned();

            if href.starts_with("http://") || href.starts_with("https://") {
                if !rest.contains("target=") {
                    rest.push_str(r#" target="_blank""#);
                }
                if !rest.contains("rel=") {
                    rest.push_str(r#" rel="noopener noreferrer""#);
                }
                if !rest.contains("class=") {
                    rest.push_str(r#" class="external-link-button""#);
                }
            }

            format!(r#"<a href="{href}"{rest}>{content}</a>"#)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_external_link_enhanced() {
        let html = r#"<a href="https://example.com">Example</a>"#;
        assert_eq!(
            enhance_external_links(html),
            r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer" class="external-link-button">Example</a>"#
        );
    }

    #[test]
    fn test_http_link_enhanced() {
        let html = r#"<a href="http://example.com">Example</a>"#;
        let result = enhance_external_links(html);
        assert!(result.contains(r#"target="_blank""#));
        assert!(result.contains(r#"rel="noopener noreferrer""#));
    }

    #[test]
    fn test_relative_link_untouched() {
        let html = r#"<a href="/guide">Guide</a>"#;
        assert_eq!(enhance_external_links(html), html);
    }

    #[test]
    fn test_fragment_link_untouched() {
        let html = r##"<a href="#section">Jump</a>"##;
        assert_eq!(enhance_external_links(html), html);
    }

    #[test]
    fn test_existing_target_kept() {
        let html = r#"<a href="https://example.com" target="_self">Example</a>"#;
        let result = enhance_external_links(html);
        assert!(result.contains(r#"target="_self""#));
        assert!(!result.contains(r#"target="_blank""#));
        // rel and class are still filled in
        assert!(result.contains(r#"rel="noopener noreferrer""#));
    }

    #[test]
    fn test_existing_class_kept() {
        let html = r#"<a href="https://example.com" class="cross-reference">Intro</a>"#;
        let result = enhance_external_links(html);
        assert!(result.contains(r#"class="cross-reference""#));
        assert!(!result.contains("external-link-button"));
    }

    #[test]
    fn test_multiple_links() {
        let html = r#"<a href="https://a.com">A</a> and <a href="/b">B</a>"#;
        let result = enhance_external_links(html);
        assert!(result.contains(r#"<a href="https://a.com" target="_blank""#));
        assert!(result.contains(r#"<a href="/b">B</a>"#));
    }
}
