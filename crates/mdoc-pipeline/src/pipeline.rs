//! The full render pipeline.

use std::panic::{self, AssertUnwindSafe};

use mdoc_extensions::{
    BLOCK_DIALECTS, BlockScanner, MathExtractor, process_hints, process_iframes, process_videos,
};
use mdoc_renderer::{
    HtmlBackend, MarkdownRenderer, TocEntry, add_heading_ids, enhance_external_links,
};
use mdoc_sanitize::{Policy, sanitize};

use crate::cache::RenderCache;
use crate::meta::{extract_description, extract_title, remove_first_h1};
use crate::registry::DocumentRegistry;

/// The fixed total order of pipeline passes.
///
/// Extractors must run before the markdown conversion so dialect fences
/// are never parsed as generic code, sanitization runs after all HTML
/// assembly, and math restoration comes last so raw TeX never meets the
/// sanitizer.
pub const PASS_ORDER: &[&str] = &[
    "cross-references",
    "math-display",
    "math-inline",
    "mermaid",
    "glsl",
    "desmos",
    "geogebra",
    "p5js",
    "video",
    "iframe",
    "hint",
    "markdown",
    "heading-ids",
    "external-links",
    "sanitize",
    "math-restore",
];

/// Result of rendering one document.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderedPage {
    /// Sanitized HTML, safe to inject into a page without escaping.
    pub html: String,
    /// Title from the first H1 heading, if any.
    pub title: Option<String>,
    /// First eligible body line, truncated, for previews and metadata.
    pub description: String,
    /// Table of contents entries (excluding the page title).
    pub toc: Vec<TocEntry>,
    /// Non-fatal problems encountered while rendering.
    pub warnings: Vec<String>,
    /// Whether the leading H1 was stripped from `html`.
    pub first_h1_removed: bool,
}

/// Markdown extension & sanitization pipeline.
///
/// Holds only read-only configuration; every [`render`](Self::render)
/// call owns its extractor counters and placeholder tables, so renders
/// can run concurrently without shared state.
///
/// # Example
///
/// ```
/// use mdoc_pipeline::{DocumentRegistry, Pipeline};
///
/// let pipeline = Pipeline::new();
/// let page = pipeline.render("# Hello\n\nSee $e^{i\\pi}$.", &DocumentRegistry::new());
/// assert_eq!(page.title, Some("Hello".to_string()));
/// assert!(page.html.contains("$e^{i\\pi}$"));
/// ```
pub struct Pipeline {
    policy: Policy,
    strip_title_heading: bool,
}

impl Pipeline {
    /// Create a pipeline with the default sanitizer policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: Policy::default(),
            strip_title_heading: false,
        }
    }

    /// Use a custom sanitizer policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Remove the first H1 from the output HTML.
    ///
    /// For callers that display the extracted title themselves.
    #[must_use]
    pub fn with_title_heading_stripped(mut self) -> Self {
        self.strip_title_heading = true;
        self
    }

    /// Render one document to sanitized HTML.
    ///
    /// Per-block errors degrade to inline error fragments; a failure of
    /// the conversion itself replaces the whole document with a single
    /// error paragraph. This never panics.
    #[must_use]
    pub fn render(&self, markdown: &str, registry: &DocumentRegistry) -> RenderedPage {
        match panic::catch_unwind(AssertUnwindSafe(|| self.render_inner(markdown, registry))) {
            Ok(page) => page,
            Err(cause) => {
                let reason = panic_message(&cause);
                tracing::error!(reason, "document render failed");
                RenderedPage {
                    html: format!("<p>Error processing content: {reason}</p>"),
                    title: None,
                    description: String::new(),
                    toc: Vec::new(),
                    warnings: vec![format!("render failed: {reason}")],
                    first_h1_removed: false,
                }
            }
        }
    }

    /// Render through a cache keyed by document path.
    #[must_use]
    pub fn render_cached(
        &self,
        path: &str,
        markdown: &str,
        registry: &DocumentRegistry,
        cache: &RenderCache,
    ) -> RenderedPage {
        if let Some(page) = cache.get(path) {
            return page;
        }
        let page = self.render(markdown, registry);
        cache.insert(path, page.clone());
        page
    }

    fn render_inner(&self, markdown: &str, registry: &DocumentRegistry) -> RenderedPage {
        let mut warnings = Vec::new();

        // The title comes from a leading `# ` line only; an H1 later in
        // the body is ordinary content and stays in the ToC.
        let title = extract_title(markdown);
        let description = extract_description(markdown);

        // Source-text passes, in PASS_ORDER.
        let text = registry.resolve_references(markdown);

        let mut math = MathExtractor::new();
        let text = math.extract_display(&text);
        let mut text = math.extract_inline(&text);

        for dialect in BLOCK_DIALECTS {
            text = BlockScanner::new(dialect).process(&text, &mut warnings);
        }
        let text = process_videos(&text, &mut warnings);
        let text = process_iframes(&text, &mut warnings);
        let text = process_hints(&text, &mut warnings);

        // Conversion and HTML post-passes. The renderer's title handling
        // is only engaged when a leading title exists, so it keeps that
        // heading (and only that one) out of the ToC.
        let mut renderer = MarkdownRenderer::<HtmlBackend>::new();
        if title.is_some() {
            renderer = renderer.with_title_extraction();
        }
        let result = renderer.render_markdown(&text);

        let html = add_heading_ids(&result.html);
        let html = enhance_external_links(&html);
        let html = sanitize(&html, &self.policy);
        let html = math.restore(&html);

        let (html, first_h1_removed) = if self.strip_title_heading {
            remove_first_h1(&html)
        } else {
            (html, false)
        };

        RenderedPage {
            html,
            title,
            description,
            toc: result.toc,
            warnings,
            first_h1_removed,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(cause: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = cause.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message
    } else {
        "unknown error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdoc_extensions::decode_payload;

    fn render(markdown: &str) -> RenderedPage {
        Pipeline::new().render(markdown, &DocumentRegistry::new())
    }

    #[test]
    fn test_pass_order_is_fixed() {
        // Extractor order mirrors the registration priorities the
        // client scripts were built against.
        assert_eq!(
            PASS_ORDER,
            &[
                "cross-references",
                "math-display",
                "math-inline",
                "mermaid",
                "glsl",
                "desmos",
                "geogebra",
                "p5js",
                "video",
                "iframe",
                "hint",
                "markdown",
                "heading-ids",
                "external-links",
                "sanitize",
                "math-restore",
            ]
        );
    }

    #[test]
    fn test_extractors_precede_conversion_and_sanitize_precedes_restore() {
        let markdown = PASS_ORDER.iter().position(|p| *p == "markdown").unwrap();
        for dialect in ["mermaid", "glsl", "desmos", "geogebra", "p5js", "video", "iframe", "hint"]
        {
            let pos = PASS_ORDER.iter().position(|p| *p == dialect).unwrap();
            assert!(pos < markdown, "{dialect} must run before conversion");
        }
        let sanitize = PASS_ORDER.iter().position(|p| *p == "sanitize").unwrap();
        let restore = PASS_ORDER.iter().position(|p| *p == "math-restore").unwrap();
        assert!(sanitize < restore);
    }

    #[test]
    fn test_basic_document() {
        let page = render("# My Doc\n\nSome short blurb.\n\nMore text.");
        assert_eq!(page.title, Some("My Doc".to_owned()));
        assert_eq!(page.description, "Some short blurb.");
        assert!(page.html.contains(r#"<h1 id="my-doc">My Doc</h1>"#));
        assert!(page.warnings.is_empty());
        assert!(!page.first_h1_removed);
    }

    #[test]
    fn test_title_requires_leading_h1_line() {
        let page = render("Body paragraph first.\n\n# Late Title\n\nMore text.");
        assert_eq!(page.title, None);
        // The late H1 is ordinary content: rendered and in the ToC.
        assert!(page.html.contains(r#"<h1 id="late-title">Late Title</h1>"#));
        assert!(page.toc.iter().any(|entry| entry.id == "late-title"));
    }

    #[test]
    fn test_leading_h1_excluded_from_toc() {
        let page = render("# My Doc\n\n## Section");
        assert_eq!(page.title, Some("My Doc".to_owned()));
        assert!(page.toc.iter().all(|entry| entry.id != "my-doc"));
        assert!(page.toc.iter().any(|entry| entry.id == "section"));
    }

    #[test]
    fn test_title_heading_stripped() {
        let pipeline = Pipeline::new().with_title_heading_stripped();
        let page = pipeline.render("# My Doc\n\nBody text.", &DocumentRegistry::new());
        assert_eq!(page.title, Some("My Doc".to_owned()));
        assert!(!page.html.contains("<h1"));
        assert!(page.first_h1_removed);
    }

    #[test]
    fn test_placeholders_in_order_with_unique_ids() {
        let markdown = "\
```mermaid
a --> b
```

middle

```mermaid
c --> d
```

```glsl
void main() {}
```
";
        let page = render(markdown);
        let first = page.html.find(r#"id="mermaid-diagram-0""#).unwrap();
        let second = page.html.find(r#"id="mermaid-diagram-1""#).unwrap();
        assert!(first < second);
        assert!(page.html.contains(r#"id="glsl-container-0""#));
    }

    #[test]
    fn test_payload_survives_sanitization_byte_for_byte() {
        let inner = "flowchart TD\n    A[\"x < y\"] --> B";
        let page = render(&format!("```mermaid\n{inner}\n```"));

        let payload = page
            .html
            .split(r#"data-diagram=""#)
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert_eq!(decode_payload(payload).unwrap(), inner);
    }

    #[test]
    fn test_sanitized_output_is_fixed_point() {
        let markdown = "\
# Doc

Text with <script>alert(1)</script> and <em>fine</em> markup.

```mermaid
a --> b
```

```hint warning
Careful **here**.
```

[link](https://example.com) and [[missing]].
";
        let page = render(markdown);
        let again = mdoc_sanitize::sanitize(&page.html, &mdoc_sanitize::Policy::default());
        assert_eq!(again, page.html);
    }

    #[test]
    fn test_script_never_survives() {
        let page = render("<script src=\"https://evil.example/x.js\"></script>\n\ntext");
        assert!(!page.html.contains("<script"));

        let page = render("<img src=\"x.png\" onerror=\"alert(1)\">");
        assert!(!page.html.contains("onerror"));

        let page = render("<p onclick=\"alert(1)\">hi</p>");
        assert!(!page.html.contains("onclick"));

        let page = render("[click](javascript:alert(1))");
        assert!(!page.html.contains("javascript:"));
    }

    #[test]
    fn test_math_preserved_verbatim() {
        let page = render(
            "Euler's formula: $e^{i\\pi}+1=0$ and $$\\int_0^1 x^2\\,dx$$",
        );
        assert!(page.html.contains("$e^{i\\pi}+1=0$"));
        assert!(page.html.contains("$$\\int_0^1 x^2\\,dx$$"));
        assert!(!page.html.contains("PLACEHOLDER"));
    }

    #[test]
    fn test_cross_references() {
        let mut registry = DocumentRegistry::new();
        registry.insert("intro", "Introduction");
        let pipeline = Pipeline::new();

        let page = pipeline.render("See [[intro]] for details.", &registry);
        assert!(
            page.html
                .contains(r#"<a href="/intro" class="cross-reference">Introduction</a>"#)
        );

        let page = pipeline.render("See [[missing]].", &registry);
        assert!(
            page.html
                .contains(r#"<span class="broken-reference">[[missing]]</span>"#)
        );
    }

    #[test]
    fn test_unclosed_hint_still_emitted() {
        let page = render("```hint tip\nfirst line\nsecond line");
        assert!(page.html.contains("mdoc-hint-tip"));
        assert!(page.html.contains("first line"));
        assert!(page.html.contains("second line"));
        assert!(page.warnings.iter().any(|w| w.contains("force-closed")));
    }

    #[test]
    fn test_dialect_fence_never_rendered_as_code() {
        let page = render("```mermaid\na --> b\n```");
        assert!(!page.html.contains("<pre>"));
        assert!(page.html.contains("mdoc-mermaid"));

        // Plain fences still become code blocks.
        let page = render("```rust\nfn main() {}\n```");
        assert!(page.html.contains(r#"class="language-rust""#));
    }

    #[test]
    fn test_external_links_enhanced_after_conversion() {
        let page = render("[Docs](https://example.com)");
        assert!(page.html.contains(r#"target="_blank""#));
        assert!(page.html.contains(r#"rel="noopener noreferrer""#));
        assert!(page.html.contains("external-link-button"));
    }

    #[test]
    fn test_raw_heading_gets_id() {
        let page = render("<h2>Raw Heading</h2>\n\ntext");
        assert!(page.html.contains(r#"<h2 id="raw-heading">"#));
    }

    #[test]
    fn test_video_error_fragment_does_not_abort_document() {
        let page = render("before\n\n```video\nwidth=640\n```\n\nafter");
        assert!(page.html.contains(r#"<div class="video-error">"#));
        assert!(page.html.contains("before"));
        assert!(page.html.contains("after"));
    }

    #[test]
    fn test_hint_fragment_survives_sanitizer() {
        let page = render("```hint success Done\nAll **good**.\n```");
        assert!(page.html.contains("mdoc-hint-success"));
        assert!(page.html.contains("<svg"));
        assert!(page.html.contains(r#"<h4 class="hint-title">Done</h4>"#));
        assert!(page.html.contains("<strong>good</strong>"));
    }

    #[test]
    fn test_render_cached() {
        let cache = RenderCache::new(8);
        let registry = DocumentRegistry::new();
        let pipeline = Pipeline::new();

        let first = pipeline.render_cached("guide", "# Guide\n\nBody.", &registry, &cache);
        assert_eq!(cache.len(), 1);
        let second = pipeline.render_cached("guide", "ignored, comes from cache", &registry, &cache);
        assert_eq!(first.html, second.html);

        cache.invalidate("guide");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_warnings_accumulate_across_extractors() {
        let page = render("```hint danger\nx\n```\n\n```mermaid\nunclosed");
        assert_eq!(page.warnings.len(), 2);
    }
}
