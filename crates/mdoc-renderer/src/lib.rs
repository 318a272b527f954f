//! Event-driven markdown renderer with pluggable backends.
//!
//! This crate provides a generic [`MarkdownRenderer`] that converts
//! `pulldown-cmark` events into HTML via the [`RenderBackend`] trait.
//!
//! # Architecture
//!
//! The renderer handles the shared Markdown surface (tables, lists,
//! inline formatting, headings with stable slug ids) generically, while
//! format-specific elements (code blocks, blockquotes, images) are
//! delegated to the backend. [`HtmlBackend`] produces semantic HTML5.
//!
//! Two post-passes complete the HTML surface:
//! - [`add_heading_ids`] assigns slug ids to raw-HTML headings that
//!   lack one (markdown-sourced headings get ids during rendering).
//! - [`enhance_external_links`] rewrites absolute `http(s)` anchors to
//!   open in a new browsing context without opener/referrer leakage.
//!
//! # Example
//!
//! ```
//! use mdoc_renderer::{MarkdownRenderer, HtmlBackend};
//!
//! let mut renderer = MarkdownRenderer::<HtmlBackend>::new()
//!     .with_title_extraction();
//! let result = renderer.render_markdown("# Hello\n\n**Bold** text");
//! assert_eq!(result.title, Some("Hello".to_string()));
//! ```

mod backend;
mod headings;
mod html;
mod links;
mod renderer;
mod state;

pub use backend::RenderBackend;
pub use headings::add_heading_ids;
pub use html::HtmlBackend;
pub use links::enhance_external_links;
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
