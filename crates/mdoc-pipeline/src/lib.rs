//! Markdown extension & sanitization pipeline.
//!
//! Renders author-written markdown into sanitized HTML for the
//! documentation site. The pipeline chains cross-reference resolution,
//! the fenced-block dialect extractors, CommonMark conversion, heading
//! and link post-passes, allow-list sanitization, and finally math
//! placeholder restoration. See [`PASS_ORDER`] for the exact sequence.
//!
//! # Example
//!
//! ```
//! use mdoc_pipeline::{DocumentRegistry, Pipeline};
//!
//! let mut registry = DocumentRegistry::new();
//! registry.insert("intro", "Introduction");
//!
//! let pipeline = Pipeline::new();
//! let page = pipeline.render("# Guide\n\nSee [[intro]].", &registry);
//! assert!(page.html.contains(r#"<a href="/intro" class="cross-reference">"#));
//! ```

mod cache;
mod meta;
mod pipeline;
mod registry;

pub use cache::RenderCache;
pub use meta::{extract_description, extract_title, remove_first_h1};
pub use pipeline::{PASS_ORDER, Pipeline, RenderedPage};
pub use registry::DocumentRegistry;
