//! Render backend trait for format-specific output.

/// Backend trait for format-specific rendering decisions.
///
/// The generic [`MarkdownRenderer`](crate::MarkdownRenderer) handles
/// shared elements (tables, lists, inline formatting, headings) and
/// delegates the format-specific ones to the backend. [`HtmlBackend`]
/// (crate::HtmlBackend) is the HTML5 implementation; other output
/// formats can plug in their own.
pub trait RenderBackend {
    /// Render a fenced code block with an optional declared language.
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Open a blockquote.
    fn blockquote_start(out: &mut String);

    /// Close a blockquote.
    fn blockquote_end(out: &mut String);

    /// Render an image with alt text and optional title.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render a hard line break.
    fn hard_break(out: &mut String) {
        out.push_str("<br>");
    }

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }

    /// Render a task list checkbox marker.
    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled>"#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled>"#);
        }
    }
}
