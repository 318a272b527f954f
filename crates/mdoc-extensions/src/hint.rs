//! Hint callout blocks.
//!
//! ` ```hint <type> <title> ` blocks become styled callout fragments.
//! Unlike the payload dialects, the body is markdown and is rendered
//! recursively, so the emitted fragment is final trusted markup rather
//! than an encoded placeholder. An unclosed hint at end of input is
//! force-closed and still emitted.

use std::sync::LazyLock;

use regex::Regex;

use mdoc_renderer::{HtmlBackend, MarkdownRenderer, escape_html};

static HINT_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```hint\s*(\w+)?\s*(.*)$").unwrap());

const INFO_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" x="0px" y="0px" width="20" height="20" viewBox="0 0 50 50"><path d="M 25 2 C 12.309295 2 2 12.309295 2 25 C 2 37.690705 12.309295 48 25 48 C 37.690705 48 48 37.690705 48 25 C 48 12.309295 37.690705 2 25 2 z M 25 4 C 36.609824 4 46 13.390176 46 25 C 46 36.609824 36.609824 46 25 46 C 13.390176 46 4 36.609824 4 25 C 4 13.390176 13.390176 4 25 4 z M 25 11 A 3 3 0 0 0 22 14 A 3 3 0 0 0 25 17 A 3 3 0 0 0 28 14 A 3 3 0 0 0 25 11 z M 21 21 L 21 23 L 22 23 L 23 23 L 23 36 L 22 36 L 21 36 L 21 38 L 22 38 L 23 38 L 27 38 L 28 38 L 29 38 L 29 36 L 28 36 L 27 36 L 27 21 L 26 21 L 22 21 L 21 21 z"></path></svg>"#;

const WARNING_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" x="0px" y="0px" width="20" height="20" viewBox="0 0 50 50"><path d="M 25 2 C 12.309295 2 2 12.309295 2 25 C 2 37.690705 12.309295 48 25 48 C 37.690705 48 48 37.690705 48 25 C 48 12.309295 37.690705 2 25 2 z M 25 4 C 36.609824 4 46 13.390176 46 25 C 46 36.609824 36.609824 46 25 46 C 13.390176 46 4 36.609824 4 25 C 4 13.390176 13.390176 4 25 4 z M 23 15 L 23 26 L 27 26 L 27 15 L 23 15 z M 23 30 L 23 34 L 27 34 L 27 30 L 23 30 z"></path></svg>"#;

const ERROR_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" x="0px" y="0px" width="20" height="20" viewBox="0 0 50 50"><path d="M 25 2 C 12.309295 2 2 12.309295 2 25 C 2 37.690705 12.309295 48 25 48 C 37.690705 48 48 37.690705 48 25 C 48 12.309295 37.690705 2 25 2 z M 25 4 C 36.609824 4 46 13.390176 46 25 C 46 36.609824 36.609824 46 25 46 C 13.390176 46 4 36.609824 4 25 C 4 13.390176 13.390176 4 25 4 z M 32.990234 15.986328 A 1.0001 1.0001 0 0 0 32.292969 16.292969 L 25 23.585938 L 17.707031 16.292969 A 1.0001 1.0001 0 0 0 16.990234 15.990234 A 1.0001 1.0001 0 0 0 16.292969 17.707031 L 23.585938 25 L 16.292969 32.292969 A 1.0001 1.0001 0 1 0 17.707031 33.707031 L 25 26.414062 L 32.292969 33.707031 A 1.0001 1.0001 0 1 0 33.707031 32.292969 L 26.414062 25 L 33.707031 17.707031 A 1.0001 1.0001 0 0 0 32.990234 15.986328 z"></path></svg>"#;

const SUCCESS_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" x="0px" y="0px" width="20" height="20" viewBox="0 0 50 50"><path d="M 25 2 C 12.309295 2 2 12.309295 2 25 C 2 37.690705 12.309295 48 25 48 C 37.690705 48 48 37.690705 48 25 C 48 12.309295 37.690705 2 25 2 z M 25 4 C 36.609824 4 46 13.390176 46 25 C 46 36.609824 36.609824 46 25 46 C 13.390176 46 4 36.609824 4 25 C 4 13.390176 13.390176 4 25 4 z M 34.988281 14.988281 A 1.0001 1.0001 0 0 0 34.171875 15.439453 L 23.970703 30.476562 L 16.679688 23.710938 A 1.0001 1.0001 0 1 0 15.320312 25.177734 L 24.316406 33.525391 L 35.828125 16.560547 A 1.0001 1.0001 0 0 0 34.988281 14.988281 z"></path></svg>"#;

const TIP_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" x="0px" y="0px" width="20" height="20" viewBox="0 0 50 50"><path d="M 25 2 C 12.309295 2 2 12.309295 2 25 C 2 37.690705 12.309295 48 25 48 C 37.690705 48 48 37.690705 48 25 C 48 12.309295 37.690705 2 25 2 z M 25 4 C 36.609824 4 46 13.390176 46 25 C 46 36.609824 36.609824 46 25 46 C 13.390176 46 4 36.609824 4 25 C 4 13.390176 13.390176 4 25 4 z M 25 10 C 18.082031 10 12.398438 15.054688 11.458984 21.642578 A 1.0001 1.0001 0 1 0 13.4375 21.986328 C 14.261719 16.632813 19.203125 12 25 12 C 31.628906 12 37 17.371094 37 24 C 37 30.628906 31.628906 36 25 36 A 1.0001 1.0001 0 1 0 25 38 C 32.710938 38 39 31.710938 39 24 C 39 16.289063 32.710938 10 25 10 z"></path></svg>"#;

const NOTE_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" x="0px" y="0px" width="20" height="20" viewBox="0 0 50 50"><path d="M 6 4 L 6 46 L 44 46 L 44 14.59375 L 34.40625 4 L 6 4 z M 8 6 L 32 6 L 32 16 L 42 16 L 42 44 L 8 44 L 8 6 z M 34 7.4375 L 40.5625 14 L 34 14 L 34 7.4375 z M 12 22 L 12 24 L 38 24 L 38 22 L 12 22 z M 12 28 L 12 30 L 38 30 L 38 28 L 12 28 z M 12 34 L 12 36 L 30 36 L 30 34 L 12 34 z"></path></svg>"#;

/// The fixed set of hint callout types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintKind {
    Info,
    Warning,
    Error,
    Success,
    Tip,
    Note,
}

impl HintKind {
    /// Parse a fence keyword, `None` for unrecognized types.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "success" => Some(Self::Success),
            "tip" => Some(Self::Tip),
            "note" => Some(Self::Note),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
            Self::Tip => "tip",
            Self::Note => "note",
        }
    }

    /// Title shown when the author gives none.
    #[must_use]
    pub fn default_title(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Success => "Success",
            Self::Tip => "Tip",
            Self::Note => "Note",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Self::Info => INFO_ICON,
            Self::Warning => WARNING_ICON,
            Self::Error => ERROR_ICON,
            Self::Success => SUCCESS_ICON,
            Self::Tip => TIP_ICON,
            Self::Note => NOTE_ICON,
        }
    }
}

/// An open hint block being accumulated.
struct OpenHint {
    kind: HintKind,
    title: String,
    lines: Vec<String>,
}

/// Replace hint blocks with rendered callout fragments.
///
/// The body is rendered as markdown, so hints can contain code blocks,
/// lists and emphasis. An unclosed hint is force-closed at end of input
/// with a warning rather than dropped.
pub fn process_hints(text: &str, warnings: &mut Vec<String>) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut state: Option<OpenHint> = None;
    let mut counter = 0;

    for line in text.lines() {
        if state.is_some() {
            if line.trim() == "```" {
                if let Some(hint) = state.take() {
                    out.push(render_hint(&hint, counter));
                    counter += 1;
                }
            } else if let Some(hint) = state.as_mut() {
                hint.lines.push(line.to_owned());
            }
            continue;
        }

        if let Some(caps) = HINT_OPEN_RE.captures(line.trim()) {
            let keyword = caps.get(1).map_or("", |m| m.as_str());
            let kind = if keyword.is_empty() {
                HintKind::Info
            } else {
                HintKind::from_keyword(keyword).unwrap_or_else(|| {
                    tracing::warn!(keyword, "unknown hint type, defaulting to info");
                    warnings.push(format!("unknown hint type '{keyword}', defaulting to info"));
                    HintKind::Info
                })
            };
            state = Some(OpenHint {
                kind,
                title: caps.get(2).map_or("", |m| m.as_str()).trim().to_owned(),
                lines: Vec::new(),
            });
        } else {
            out.push(line.to_owned());
        }
    }

    if let Some(hint) = state.take() {
        tracing::warn!("unclosed hint block, force-closing at end of document");
        warnings.push("unclosed hint block force-closed at end of document".to_owned());
        out.push(render_hint(&hint, counter));
    }

    out.join("\n")
}

fn render_hint(hint: &OpenHint, index: usize) -> String {
    // Core CommonMark only: fenced code inside a callout is wanted,
    // the extended table/tasklist surface is not.
    let body = MarkdownRenderer::<HtmlBackend>::new()
        .render_plain(&hint.lines.join("\n"))
        .html;

    let title = if hint.title.is_empty() {
        hint.kind.default_title().to_owned()
    } else {
        escape_html(&hint.title)
    };

    format!(
        r#"<div class="mdoc-hint mdoc-hint-{kind}" id="hint-{index}">
    <div class="hint-header">
        <div class="hint-icon">{icon}</div>
        <h4 class="hint-title">{title}</h4>
    </div>
    <div class="hint-content">
        {body}
    </div>
</div>"#,
        kind = hint.kind.as_str(),
        icon = hint.kind.icon(),
    )
}
