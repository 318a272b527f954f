//! Math span extraction and restoration.
//!
//! `$...$` and `$$...$$` spans are pulled out of the source before any
//! other pass so the markdown converter never mangles TeX, and the
//! literal text (delimiters included) is substituted back into the
//! final HTML *after* sanitization. Client-side math rendering needs
//! the delimiters verbatim; they must never be escaped or filtered.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static DISPLAY_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").unwrap());

/// Extracts math spans into placeholder tokens and restores them later.
///
/// Placeholder counters are scoped to this instance, so every render
/// call owns an extractor of its own.
#[derive(Default)]
pub struct MathExtractor {
    /// Placeholder token → original delimited text, in extraction order.
    placeholders: Vec<(String, String)>,
    display_count: usize,
    inline_count: usize,
}

impl MathExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `$$...$$` spans with `DISPLAY_MATH_PLACEHOLDER_<n>` tokens.
    ///
    /// Runs before [`extract_inline`](Self::extract_inline) so inline
    /// scanning never sees a `$$` delimiter.
    pub fn extract_display(&mut self, text: &str) -> String {
        DISPLAY_MATH_RE
            .replace_all(text, |caps: &Captures<'_>| {
                let token = format!("DISPLAY_MATH_PLACEHOLDER_{}", self.display_count);
                self.display_count += 1;
                self.placeholders
                    .push((token.clone(), format!("$${}$$", &caps[1])));
                token
            })
            .into_owned()
    }

    /// Replace `$...$` spans with `INLINE_MATH_PLACEHOLDER_<n>` tokens.
    ///
    /// A delimiter is a single `$` not adjacent to another `$`, so
    /// leftover doubled dollars never open an inline span.
    pub fn extract_inline(&mut self, text: &str) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < bytes.len() {
            if is_single_dollar(bytes, i) {
                if let Some(close) = find_closing_dollar(bytes, i + 1) {
                    let token = format!("INLINE_MATH_PLACEHOLDER_{}", self.inline_count);
                    self.inline_count += 1;
                    self.placeholders
                        .push((token.clone(), text[i..=close].to_owned()));
                    out.push_str(&token);
                    i = close + 1;
                    continue;
                }
            }
            let c = text[i..].chars().next().unwrap_or('\0');
            out.push(c);
            i += c.len_utf8();
        }

        out
    }

    /// Substitute every placeholder token back with its literal math.
    #[must_use]
    pub fn restore(&self, html: &str) -> String {
        let mut result = html.to_owned();
        // Highest-numbered tokens first: `_1` is a prefix of `_10`.
        for (token, math) in self.placeholders.iter().rev() {
            result = result.replace(token.as_str(), math);
        }
        result
    }

    /// Number of spans extracted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placeholders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }
}

/// `bytes[i]` is a `$` with no `$` on either side.
fn is_single_dollar(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'$'
        && (i == 0 || bytes[i - 1] != b'$')
        && bytes.get(i + 1).is_none_or(|b| *b != b'$')
}

fn find_closing_dollar(bytes: &[u8], from: usize) -> Option<usize> {
    (from..bytes.len()).find(|&k| is_single_dollar(bytes, k))
}
