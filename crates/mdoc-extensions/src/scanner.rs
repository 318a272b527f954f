//! Generic fenced-block extractor.
//!
//! One line-oriented state machine handles every payload-carrying
//! dialect, parameterized by a [`DialectSpec`]. Recognized blocks are
//! replaced by a single placeholder div line; everything else passes
//! through untouched.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::DialectSpec;
use crate::payload::encode_payload;

static DIMENSIONS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)x(\d+)$").unwrap());

/// An open block being accumulated.
struct OpenBlock {
    /// The `data-*` flag set by the modifier keyword, if any.
    modifier_attr: Option<&'static str>,
    /// `WxH` dimensions from the opening fence, if any.
    dimensions: Option<(String, String)>,
    lines: Vec<String>,
}

/// Line scanner for one dialect.
///
/// Counters are local to a single [`process`](Self::process) call, so
/// concurrent renders never share placeholder ids.
pub struct BlockScanner<'a> {
    spec: &'a DialectSpec,
}

impl<'a> BlockScanner<'a> {
    #[must_use]
    pub fn new(spec: &'a DialectSpec) -> Self {
        Self { spec }
    }

    /// Replace every closed block of this dialect with a placeholder div.
    ///
    /// An unclosed block at end of input is dropped with a warning.
    pub fn process(&self, text: &str, warnings: &mut Vec<String>) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut state: Option<OpenBlock> = None;
        let mut counter = 0;

        for line in text.lines() {
            if state.is_some() {
                if line.trim() == "```" {
                    if let Some(block) = state.take() {
                        out.push(self.emit(&block, counter));
                        counter += 1;
                    }
                } else if let Some(block) = state.as_mut() {
                    block.lines.push(line.to_owned());
                }
                continue;
            }

            if let Some(open) = self.parse_open(line) {
                state = Some(open);
            } else {
                out.push(line.to_owned());
            }
        }

        if state.is_some() {
            tracing::warn!(
                dialect = self.spec.keyword,
                "unclosed block at end of document, content dropped"
            );
            warnings.push(format!(
                "unclosed {} block dropped at end of document",
                self.spec.keyword
            ));
        }

        out.join("\n")
    }

    /// Parse an opening fence line: ` ```keyword [modifier [WxH]] `.
    fn parse_open(&self, line: &str) -> Option<OpenBlock> {
        let trimmed = line.trim();
        let rest = trimmed.strip_prefix("```")?.strip_prefix(self.spec.keyword)?;
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }

        let mut tokens = rest.split_whitespace();
        let modifier_attr = match tokens.next() {
            None => None,
            Some(token) => {
                let (_, attr) = self
                    .spec
                    .modifiers
                    .iter()
                    .find(|(keyword, _)| *keyword == token)?;
                Some(*attr)
            }
        };

        let dimensions = if self.spec.allow_dimensions && modifier_attr.is_some() {
            tokens.next().and_then(|token| {
                DIMENSIONS_RE
                    .captures(token)
                    .map(|caps| (caps[1].to_owned(), caps[2].to_owned()))
            })
        } else {
            None
        };

        Some(OpenBlock {
            modifier_attr,
            dimensions,
            lines: Vec::new(),
        })
    }

    fn emit(&self, block: &OpenBlock, index: usize) -> String {
        let payload = encode_payload(&block.lines.join("\n"));
        let mut div = format!(
            r#"<div class="{}" id="{}-{index}" {}="{payload}""#,
            self.spec.css_class, self.spec.id_prefix, self.spec.data_attr
        );
        if let Some(attr) = block.modifier_attr {
            write!(div, r#" {attr}="true""#).unwrap();
        }
        if let Some((width, height)) = &block.dimensions {
            write!(div, r#" data-width="{width}" data-height="{height}""#).unwrap();
        }
        div.push_str("></div>");
        div
    }
}
