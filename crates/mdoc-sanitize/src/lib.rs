//! Allow-list HTML sanitizer.
//!
//! Filters rendered HTML against an explicit allow-list of tags,
//! per-tag attributes and URL protocols. Anything not enumerated in the
//! [`Policy`] is neutralized: disallowed tags are escaped in place,
//! disallowed attributes and URL schemes are dropped. The walk is a
//! plain tokenizer over the string, so the security-relevant decisions
//! are all local and directly unit-testable.
//!
//! # Example
//!
//! ```
//! use mdoc_sanitize::{Policy, sanitize};
//!
//! let policy = Policy::default();
//! let html = sanitize(r#"<p onclick="alert(1)">Hi</p>"#, &policy);
//! assert_eq!(html, "<p>Hi</p>");
//! ```

mod clean;
mod policy;

pub use clean::sanitize;
pub use policy::Policy;
