//! Title and description extraction from raw markdown.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum description length in characters.
const DESCRIPTION_MAX_LEN: usize = 200;

static FIRST_H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h1[^>]*>.*?</h1>").unwrap());

/// Extract the page title from a leading `# ` heading line.
#[must_use]
pub fn extract_title(markdown: &str) -> Option<String> {
    markdown
        .trim()
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_owned())
}

/// Extract a short description: the first non-empty line after the
/// title that is neither a heading nor a fence, truncated to 200 chars.
#[must_use]
pub fn extract_description(markdown: &str) -> String {
    markdown
        .trim()
        .lines()
        .skip(1)
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("```"))
        .map(|line| line.chars().take(DESCRIPTION_MAX_LEN).collect())
        .unwrap_or_default()
}

/// Remove the first `<h1>` element from rendered HTML.
///
/// Used when the caller displays the extracted title itself and wants
/// to avoid a duplicate. Returns the HTML and whether a heading was
/// removed.
#[must_use]
pub fn remove_first_h1(html: &str) -> (String, bool) {
    match FIRST_H1_RE.find(html) {
        Some(m) => {
            let mut out = String::with_capacity(html.len() - m.len());
            out.push_str(&html[..m.start()]);
            out.push_str(&html[m.end()..]);
            (out, true)
        }
        None => (html.to_owned(), false),
    }
}
