//! Allow-list HTML sanitization over a raw token walk.
//!
//! The sanitizer tokenizes the input into text, comments and tags,
//! rebuilds every allowed tag from its parsed parts, and escapes
//! everything else in place. Disallowed tags are neutralized rather
//! than removed so authors can see what was rejected. Output is a
//! fixed point: sanitizing already-sanitized HTML changes nothing.

use crate::policy::{Policy, URL_ATTRIBUTES};

/// Sanitize an HTML string against the given allow-list policy.
///
/// - Tags not in the allow-list are escaped (`<script>` becomes
///   `&lt;script&gt;`), along with their closing tags.
/// - Attributes not allowed for their tag are dropped.
/// - URL-bearing attributes with a scheme outside the allowed protocol
///   set are dropped entirely.
/// - Text and comments pass through unchanged; a stray `<` that does
///   not open a tag is escaped.
#[must_use]
pub fn sanitize(html: &str, policy: &Policy) -> String {
    let mut out = String::with_capacity(html.len());
    let bytes = html.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            let start = i;
            while i < bytes.len() && bytes[i] != b'<' {
                i += 1;
            }
            out.push_str(&html[start..i]);
            continue;
        }

        if html[i..].starts_with("<!--") {
            // Comments are preserved verbatim; an unterminated one is escaped.
            if let Some(end) = html[i..].find("-->") {
                out.push_str(&html[i..i + end + 3]);
                i += end + 3;
            } else {
                out.push_str("&lt;");
                i += 1;
            }
            continue;
        }

        match parse_tag(&html[i..]) {
            Some(tag) => {
                emit_tag(&tag, &html[i..i + tag.len], policy, &mut out);
                i += tag.len;
            }
            None => {
                out.push_str("&lt;");
                i += 1;
            }
        }
    }

    out
}

/// A parsed tag token.
struct RawTag {
    /// Lowercased tag name.
    name: String,
    /// Whether this is a `</...>` closing tag.
    closing: bool,
    /// Whether the tag ends in `/>`.
    self_closing: bool,
    /// Attributes in source order, names kept in original case (`viewBox`
    /// must round-trip); `None` value means a bare attribute.
    attrs: Vec<(String, Option<String>)>,
    /// Byte length of the tag in the source, including `<` and `>`.
    len: usize,
}

/// Parse a tag starting at `input[0] == '<'`. Returns `None` when the
/// input does not form a complete tag (so the `<` gets escaped as text).
fn parse_tag(input: &str) -> Option<RawTag> {
    let bytes = input.as_bytes();
    let mut i = 1;

    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    // Tag names start with a letter.
    if !bytes.get(i)?.is_ascii_alphabetic() {
        return None;
    }
    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    let name = input[name_start..i].to_ascii_lowercase();

    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                i += 1;
                if bytes.get(i)? == &b'>' {
                    self_closing = true;
                    i += 1;
                    break;
                }
            }
            _ => {
                let (attr, next) = parse_attribute(input, i)?;
                attrs.push(attr);
                i = next;
            }
        }
    }

    Some(RawTag {
        name,
        closing,
        self_closing,
        attrs,
        len: i,
    })
}

/// Parse one attribute starting at a non-whitespace position.
fn parse_attribute(input: &str, mut i: usize) -> Option<((String, Option<String>), usize)> {
    let bytes = input.as_bytes();

    let name_start = i;
    while i < bytes.len() {
        match bytes[i] {
            b'=' | b'>' | b'/' => break,
            c if c.is_ascii_whitespace() => break,
            _ => i += 1,
        }
    }
    if i == name_start {
        // Not an attribute character at all; treat the tag as malformed.
        return None;
    }
    let name = input[name_start..i].to_owned();

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if bytes.get(i) != Some(&b'=') {
        return Some(((name, None), i));
    }
    i += 1;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    let value = match bytes.get(i)? {
        quote @ (b'"' | b'\'') => {
            let value_start = i + 1;
            let mut j = value_start;
            while j < bytes.len() && bytes[j] != *quote {
                j += 1;
            }
            if j >= bytes.len() {
                return None;
            }
            i = j + 1;
            input[value_start..j].to_owned()
        }
        _ => {
            let value_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                i += 1;
            }
            input[value_start..i].to_owned()
        }
    };

    Some(((name, Some(value)), i))
}

/// Write a parsed tag to the output, applying the policy.
fn emit_tag(tag: &RawTag, raw: &str, policy: &Policy, out: &mut String) {
    if !policy.is_tag_allowed(&tag.name) {
        tracing::debug!(tag = %tag.name, "escaping disallowed tag");
        out.push_str(&escape_text(raw));
        return;
    }

    if tag.closing {
        out.push_str("</");
        out.push_str(&tag.name);
        out.push('>');
        return;
    }

    out.push('<');
    out.push_str(&tag.name);
    for (attr, value) in &tag.attrs {
        // The allow-list is lowercase; emission keeps the source case.
        let attr_name = attr.to_ascii_lowercase();
        if !policy.is_attribute_allowed(&tag.name, &attr_name) {
            continue;
        }
        match value {
            None => {
                out.push(' ');
                out.push_str(attr);
            }
            Some(value) => {
                if URL_ATTRIBUTES.contains(&attr_name.as_str())
                    && !is_url_allowed(policy, &tag.name, &attr_name, value)
                {
                    tracing::debug!(tag = %tag.name, attr = %attr, "dropping disallowed url");
                    continue;
                }
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
        }
    }
    if tag.self_closing {
        out.push('/');
    }
    out.push('>');
}

/// Check a URL attribute value against the protocol allow-list.
///
/// Scheme detection mirrors browser parsing: ASCII control characters
/// and whitespace are ignored, character references that could smuggle
/// a colon are decoded first, and the scheme comparison is
/// case-insensitive. Scheme-less (relative and fragment) URLs are
/// always allowed.
fn is_url_allowed(policy: &Policy, tag: &str, attr: &str, value: &str) -> bool {
    let decoded = decode_scheme_entities(value);
    let cleaned: String = decoded
        .chars()
        .filter(|c| !c.is_ascii_control() && !c.is_whitespace())
        .collect();

    match cleaned.find(':') {
        Some(pos) => {
            // A colon after a path/query/fragment delimiter is not a scheme.
            let before = &cleaned[..pos];
            if before.contains('/') || before.contains('?') || before.contains('#') {
                return true;
            }
            let scheme = before.to_ascii_lowercase();
            policy.is_protocol_allowed(tag, attr, &scheme)
        }
        None => true,
    }
}

/// Decode character references that could hide a URL scheme
/// (`&colon;`, `&#58;`, `&#x3a;`, and other numeric escapes).
fn decode_scheme_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let bytes = value.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'&' {
            if let Some((c, len)) = decode_entity(&value[i..]) {
                out.push(c);
                i += len;
                continue;
            }
        }
        let c = value[i..].chars().next().unwrap_or('\0');
        out.push(c);
        i += c.len_utf8();
    }

    out
}

/// Decode a single character reference at the start of `input`.
fn decode_entity(input: &str) -> Option<(char, usize)> {
    let semi = input.find(';')?;
    if semi > 12 {
        return None;
    }
    let body = &input[1..semi];

    let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = body.strip_prefix('#') {
        dec.parse().ok()?
    } else if body.eq_ignore_ascii_case("colon") {
        58
    } else if body.eq_ignore_ascii_case("tab") {
        9
    } else if body.eq_ignore_ascii_case("newline") {
        10
    } else {
        return None;
    };

    Some((char::from_u32(code)?, semi + 1))
}

/// True when `input` starts with a character reference (`&amp;`,
/// `&#38;`, ...), in which case the `&` must not be re-escaped.
fn starts_with_entity(input: &str) -> bool {
    let Some(rest) = input.strip_prefix('&') else {
        return false;
    };
    let Some(semi) = rest.find(';') else {
        return false;
    };
    if semi == 0 || semi > 30 {
        return false;
    }
    let body = &rest[..semi];
    if let Some(num) = body.strip_prefix('#') {
        let num = num.strip_prefix(['x', 'X']).unwrap_or(num);
        !num.is_empty() && num.chars().all(|c| c.is_ascii_hexdigit())
    } else {
        body.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

/// Escape `<`, `>` and bare `&` for text context. Existing character
/// references are left intact so sanitization stays idempotent.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if !starts_with_entity(&s[i..]) => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for a double-quoted attribute.
fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '&' if !starts_with_entity(&s[i..]) => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn clean(html: &str) -> String {
        sanitize(html, &Policy::default())
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(clean("hello world"), "hello world");
    }

    #[test]
    fn test_allowed_tag_kept() {
        assert_eq!(clean("<p>text</p>"), "<p>text</p>");
    }

    #[test]
    fn test_script_tag_escaped() {
        assert_eq!(
            clean("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_script_with_src_escaped() {
        let result = clean(r#"<script src="https://evil.example/x.js"></script>"#);
        assert!(!result.contains("<script"));
        assert!(result.starts_with("&lt;script"));
    }

    #[test]
    fn test_event_handler_dropped() {
        assert_eq!(
            clean(r#"<p onclick="alert(1)">text</p>"#),
            "<p>text</p>"
        );
    }

    #[test]
    fn test_event_handler_dropped_on_img() {
        let result = clean(r#"<img src="x.png" onerror="alert(1)">"#);
        assert_eq!(result, r#"<img src="x.png">"#);
    }

    #[test]
    fn test_javascript_url_dropped() {
        assert_eq!(
            clean(r#"<a href="javascript:alert(1)">x</a>"#),
            "<a>x</a>"
        );
    }

    #[test]
    fn test_javascript_url_mixed_case_dropped() {
        let result = clean(r#"<a href="JaVaScRiPt:alert(1)">x</a>"#);
        assert!(!result.contains("href"));
    }

    #[test]
    fn test_javascript_url_with_control_chars_dropped() {
        let result = clean("<a href=\"java\tscri\npt:alert(1)\">x</a>");
        assert!(!result.contains("href"));
    }

    #[test]
    fn test_javascript_url_entity_encoded_dropped() {
        let result = clean(r#"<a href="javascript&colon;alert(1)">x</a>"#);
        assert!(!result.contains("href"));
        let result = clean(r##"<a href="&#106;avascript:alert(1)">x</a>"##);
        assert!(!result.contains("href"));
        let result = clean(r##"<a href="&#x6a;avascript:alert(1)">x</a>"##);
        assert!(!result.contains("href"));
    }

    #[test]
    fn test_relative_url_allowed() {
        assert_eq!(clean(r#"<a href="/intro">x</a>"#), r#"<a href="/intro">x</a>"#);
    }

    #[test]
    fn test_fragment_url_allowed() {
        assert_eq!(
            clean(r##"<a href="#section">x</a>"##),
            r##"<a href="#section">x</a>"##
        );
    }

    #[test]
    fn test_colon_in_query_not_a_scheme() {
        let html = r#"<a href="/search?q=a:b">x</a>"#;
        assert_eq!(clean(html), html);
    }

    #[test]
    fn test_data_uri_on_img_allowed() {
        let html = r#"<img src="data:image/png;base64,iVBOR">"#;
        assert_eq!(clean(html), html);
    }

    #[test]
    fn test_data_uri_on_anchor_dropped() {
        let result = clean(r#"<a href="data:text/html,<script>alert(1)</script>">x</a>"#);
        assert!(!result.contains("href"));
    }

    #[test]
    fn test_disallowed_attribute_dropped() {
        assert_eq!(
            clean(r#"<p style="color:red" class="note">x</p>"#),
            r#"<p class="note">x</p>"#
        );
    }

    #[test]
    fn test_placeholder_div_preserved() {
        let html = r#"<div class="mdoc-mermaid" id="mermaid-diagram-0" data-diagram="Zmxvd2NoYXJ0"></div>"#;
        assert_eq!(clean(html), html);
    }

    #[test]
    fn test_iframe_bounded_attrs() {
        let html = r#"<iframe src="https://example.com" width="100%" height="400" loading="lazy"></iframe>"#;
        assert_eq!(clean(html), html);
        let result = clean(r#"<iframe srcdoc="<script>alert(1)</script>"></iframe>"#);
        assert!(!result.contains("srcdoc"));
    }

    #[test]
    fn test_bare_attributes_kept() {
        let html = r#"<video controls autoplay muted></video>"#;
        assert_eq!(clean(html), html);
    }

    #[test]
    fn test_stray_angle_bracket_escaped() {
        assert_eq!(clean("1 < 2"), "1 &lt; 2");
    }

    #[test]
    fn test_comment_preserved() {
        assert_eq!(clean("<!-- note -->"), "<!-- note -->");
    }

    #[test]
    fn test_doctype_escaped() {
        let result = clean("<!DOCTYPE html>");
        assert!(result.starts_with("&lt;"));
    }

    #[test]
    fn test_unterminated_tag_escaped() {
        assert_eq!(clean("<a href=\"x"), "&lt;a href=\"x");
    }

    #[test]
    fn test_entities_not_double_escaped() {
        assert_eq!(clean("a &amp; b"), "a &amp; b");
        assert_eq!(
            clean(r#"<p class="a &amp; b">x</p>"#),
            r#"<p class="a &amp; b">x</p>"#
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<script>alert(1)</script>",
            r#"<p onclick="x">1 < 2 & 3 > 2</p>"#,
            r#"<a href="javascript:alert(1)">x</a>"#,
            r#"<div class="mdoc-hint"><svg viewBox="0 0 50 50"><path d="M 25 2"></path></svg></div>"#,
            "plain text with $math$ and <em>emphasis</em>",
        ];
        let policy = Policy::default();
        for input in inputs {
            let once = sanitize(input, &policy);
            let twice = sanitize(&once, &policy);
            assert_eq!(once, twice, "not a fixed point for {input:?}");
        }
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let result = clean(r#"<p title="a > b">x</p>"#);
        // title is not allowed on p, but the tag must still parse fully
        assert_eq!(result, "<p>x</p>");
    }

    #[test]
    fn test_svg_icon_survives() {
        let html = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" viewBox="0 0 50 50"><path d="M 25 2 C 12 2 2 12 2 25"></path></svg>"#;
        assert_eq!(clean(html), html);
    }

    #[test]
    fn test_custom_policy() {
        let policy = Policy::new().allow_tag("b", &[]);
        assert_eq!(sanitize("<b>x</b> <i>y</i>", &policy), "<b>x</b> &lt;i&gt;y&lt;/i&gt;");
    }
}
