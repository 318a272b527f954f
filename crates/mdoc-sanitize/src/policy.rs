//! Sanitizer allow-list configuration.

use std::collections::{HashMap, HashSet};

/// Attributes whose values are URLs and therefore subject to protocol checks.
pub(crate) const URL_ATTRIBUTES: &[&str] = &["href", "src", "poster", "cite", "action"];

/// Allow-list policy for HTML sanitization.
///
/// A policy enumerates the permitted tags, the attributes each tag may
/// carry, and the URL schemes URL-bearing attributes may use. Everything
/// not enumerated is rejected. Built once at startup and shared
/// read-only across renders.
#[derive(Clone, Debug)]
pub struct Policy {
    tags: HashSet<&'static str>,
    attributes: HashMap<&'static str, Vec<&'static str>>,
    protocols: Vec<&'static str>,
    /// Extra protocols allowed for a specific (tag, attribute) pair,
    /// e.g. data URIs on `img[src]` only.
    attr_protocols: HashMap<(&'static str, &'static str), Vec<&'static str>>,
}

impl Policy {
    /// Create an empty policy that rejects every tag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tags: HashSet::new(),
            attributes: HashMap::new(),
            protocols: Vec::new(),
            attr_protocols: HashMap::new(),
        }
    }

    /// Allow a tag with the given attribute list.
    #[must_use]
    pub fn allow_tag(mut self, tag: &'static str, attributes: &[&'static str]) -> Self {
        self.tags.insert(tag);
        if !attributes.is_empty() {
            self.attributes.insert(tag, attributes.to_vec());
        }
        self
    }

    /// Allow a set of tags that share the same attribute list.
    #[must_use]
    pub fn allow_tags(mut self, tags: &[&'static str], attributes: &[&'static str]) -> Self {
        for tag in tags {
            self.tags.insert(tag);
            if !attributes.is_empty() {
                self.attributes.insert(tag, attributes.to_vec());
            }
        }
        self
    }

    /// Set the URL schemes permitted on URL-bearing attributes.
    #[must_use]
    pub fn allow_protocols(mut self, protocols: &[&'static str]) -> Self {
        self.protocols = protocols.to_vec();
        self
    }

    /// Allow extra URL schemes for one (tag, attribute) pair.
    #[must_use]
    pub fn allow_attr_protocols(
        mut self,
        tag: &'static str,
        attribute: &'static str,
        protocols: &[&'static str],
    ) -> Self {
        self.attr_protocols
            .insert((tag, attribute), protocols.to_vec());
        self
    }

    pub(crate) fn is_tag_allowed(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub(crate) fn is_attribute_allowed(&self, tag: &str, attribute: &str) -> bool {
        self.attributes
            .get(tag)
            .is_some_and(|attrs| attrs.contains(&attribute))
    }

    pub(crate) fn is_protocol_allowed(&self, tag: &str, attribute: &str, scheme: &str) -> bool {
        if self.protocols.iter().any(|p| *p == scheme) {
            return true;
        }
        self.attr_protocols
            .get(&(tag, attribute))
            .is_some_and(|protocols| protocols.iter().any(|p| *p == scheme))
    }
}

impl Default for Policy {
    /// The documentation-site policy.
    ///
    /// Covers the standard markdown output surface plus the placeholder
    /// divs, hint callouts and embed frames the extension pipeline
    /// emits. Scriptable elements (`iframe`, `video`) carry only the
    /// bounded attribute sets those fragments actually use; `script` is
    /// never allowed.
    fn default() -> Self {
        Self::new()
            .allow_tags(
                &[
                    "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "ul", "ol", "li", "pre",
                    "blockquote", "code", "table", "thead", "tbody", "tr", "td",
                ],
                &["class", "id"],
            )
            .allow_tag("a", &["href", "title", "id", "name", "class", "target", "rel"])
            .allow_tag("img", &["src", "alt", "title", "width", "height"])
            .allow_tag("th", &["class", "scope"])
            .allow_tag(
                "div",
                &[
                    "class",
                    "id",
                    "data-fragment-shader",
                    "data-simple-display",
                    "data-no-ui",
                    "data-width",
                    "data-height",
                    "data-graph-config",
                    "data-diagram",
                    "data-geogebra-config",
                    "data-sketch-code",
                ],
            )
            .allow_tag("canvas", &["width", "height", "class", "id"])
            .allow_tag("select", &["class", "id"])
            .allow_tag("option", &["value", "selected"])
            .allow_tag(
                "input",
                &["type", "min", "max", "step", "value", "class", "id", "checked", "disabled"],
            )
            .allow_tag("button", &["class", "id", "type"])
            .allow_tags(&["strong", "em", "hr", "br", "del", "s", "dl", "dt", "dd", "label"], &[])
            .allow_tag(
                "iframe",
                &[
                    "src",
                    "width",
                    "height",
                    "frameborder",
                    "allowfullscreen",
                    "allow",
                    "sandbox",
                    "loading",
                    "title",
                ],
            )
            .allow_tag(
                "video",
                &["width", "height", "controls", "autoplay", "muted", "loop", "poster"],
            )
            .allow_tag("source", &["src", "type"])
            .allow_tag(
                "svg",
                &["xmlns", "x", "y", "width", "height", "viewbox", "class"],
            )
            .allow_tag("path", &["d", "fill"])
            .allow_protocols(&["http", "https", "mailto", "tel", "ftp"])
            .allow_attr_protocols("img", "src", &["data"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_policy_rejects_everything() {
        let policy = Policy::new();
        assert!(!policy.is_tag_allowed("p"));
        assert!(!policy.is_attribute_allowed("p", "class"));
        assert!(!policy.is_protocol_allowed("a", "href", "https"));
    }

    #[test]
    fn test_default_policy_tags() {
        let policy = Policy::default();
        assert!(policy.is_tag_allowed("p"));
        assert!(policy.is_tag_allowed("div"));
        assert!(policy.is_tag_allowed("iframe"));
        assert!(!policy.is_tag_allowed("script"));
        assert!(!policy.is_tag_allowed("object"));
        assert!(!policy.is_tag_allowed("embed"));
        assert!(!policy.is_tag_allowed("style"));
    }

    #[test]
    fn test_default_policy_attributes() {
        let policy = Policy::default();
        assert!(policy.is_attribute_allowed("a", "href"));
        assert!(policy.is_attribute_allowed("div", "data-diagram"));
        assert!(!policy.is_attribute_allowed("a", "onclick"));
        assert!(!policy.is_attribute_allowed("div", "style"));
    }

    #[test]
    fn test_default_policy_protocols() {
        let policy = Policy::default();
        assert!(policy.is_protocol_allowed("a", "href", "https"));
        assert!(policy.is_protocol_allowed("a", "href", "mailto"));
        assert!(!policy.is_protocol_allowed("a", "href", "javascript"));
        // data URIs only on img[src]
        assert!(policy.is_protocol_allowed("img", "src", "data"));
        assert!(!policy.is_protocol_allowed("a", "href", "data"));
    }

    #[test]
    fn test_scriptable_tags_have_bounded_attrs() {
        // iframe/video are allowed for the embed dialects but must not
        // accept event handlers or unrestricted attributes.
        let policy = Policy::default();
        assert!(!policy.is_attribute_allowed("iframe", "onload"));
        assert!(!policy.is_attribute_allowed("iframe", "srcdoc"));
        assert!(!policy.is_attribute_allowed("video", "onerror"));
    }
}
