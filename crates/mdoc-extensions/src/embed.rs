//! Video and iframe embed dialects.
//!
//! Both accept a fenced block of `key=value` / bare-flag lines or the
//! single-line `![video](url){opt1,opt2=val}` shorthand. Video URLs are
//! dispatched by host: known hosting providers get their embed player,
//! anything else falls back to a native `<video>` element. A missing
//! URL is a recoverable error producing an inline error fragment.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use mdoc_renderer::escape_html;

static VIDEO_SHORTHAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[video\]\(([^)]+)\)(?:\{([^}]+)\})?").unwrap());

static IFRAME_SHORTHAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[iframe\]\(([^)]+)\)(?:\{([^}]+)\})?").unwrap());

static YOUTUBE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([a-zA-Z0-9_-]+)").unwrap());

static VIMEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"vimeo\.com/(\d+)").unwrap());

static TWITCH_VIDEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"twitch\.tv/videos/(\d+)").unwrap());

static TWITCH_CHANNEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"twitch\.tv/([a-zA-Z0-9_]+)").unwrap());

/// Configuration collected from a block or shorthand options.
///
/// Bare flags are stored with the value `"true"`.
#[derive(Default)]
struct EmbedConfig(HashMap<String, String>);

impl EmbedConfig {
    fn from_shorthand(url: &str, options: &str) -> Self {
        let mut config = Self::default();
        config.0.insert("url".to_owned(), url.to_owned());
        for option in options.split(',') {
            config.parse_line(option);
        }
        config
    }

    fn parse_line(&mut self, line: &str) {
        let line = line.trim();
        if let Some((key, value)) = line.split_once('=') {
            self.0
                .insert(key.trim().to_owned(), value.trim().to_owned());
        } else if !line.is_empty() {
            self.0.insert(line.to_owned(), "true".to_owned());
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// `controls` defaults to on; only an explicit `controls=false` disables it.
    fn controls_enabled(&self) -> bool {
        self.get("controls").is_none_or(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Generic engine for the two embed dialects.
fn process_embed(
    text: &str,
    keyword: &str,
    shorthand: &Regex,
    render: impl Fn(&EmbedConfig, usize) -> String,
    warnings: &mut Vec<String>,
) -> String {
    let fence = format!("```{keyword}");
    let mut out: Vec<String> = Vec::new();
    let mut state: Option<EmbedConfig> = None;
    let mut counter = 0;

    for line in text.lines() {
        if state.is_some() {
            if line.trim() == "```" {
                if let Some(config) = state.take() {
                    out.push(render(&config, counter));
                    counter += 1;
                }
            } else if let Some(config) = state.as_mut() {
                config.parse_line(line);
            }
            continue;
        }

        if line.trim() == fence {
            state = Some(EmbedConfig::default());
            continue;
        }

        if let Some(caps) = shorthand.captures(line.trim()) {
            let config = EmbedConfig::from_shorthand(
                &caps[1],
                caps.get(2).map_or("", |m| m.as_str()),
            );
            out.push(render(&config, counter));
            counter += 1;
            continue;
        }

        out.push(line.to_owned());
    }

    if state.is_some() {
        tracing::warn!(dialect = keyword, "unclosed block at end of document, content dropped");
        warnings.push(format!(
            "unclosed {keyword} block dropped at end of document"
        ));
    }

    out.join("\n")
}

/// Replace `video` blocks and `![video](...)` shorthands with embeds.
pub fn process_videos(text: &str, warnings: &mut Vec<String>) -> String {
    process_embed(text, "video", &VIDEO_SHORTHAND_RE, render_video, warnings)
}

/// Replace `iframe` blocks and `![iframe](...)` shorthands with embeds.
pub fn process_iframes(text: &str, warnings: &mut Vec<String>) -> String {
    process_embed(text, "iframe", &IFRAME_SHORTHAND_RE, render_iframe, warnings)
}

fn render_video(config: &EmbedConfig, index: usize) -> String {
    let Some(url) = config.get("url") else {
        return r#"<div class="video-error">Error: No video URL provided</div>"#.to_owned();
    };
    let id = format!("video-{index}");

    if url.contains("youtube.com/watch") || url.contains("youtu.be/") {
        render_youtube(url, config, &id)
    } else if url.contains("vimeo.com") {
        render_vimeo(url, config, &id)
    } else if url.contains("twitch.tv") {
        render_twitch(url, config, &id)
    } else {
        render_native_video(url, config, &id)
    }
}

/// Wrap the player markup in the shared component chrome.
fn component_frame(id: &str, class: &str, label: &str, url: &str, body: &str) -> String {
    format!(
        r#"<div class="{class}" id="{id}">
    <div class="component-header">
        <span>{label}</span>
        <a href="{url}" target="_blank" class="video-external-link">↗</a>
    </div>
    <div class="component-body">
        {body}
    </div>
</div>"#,
        url = escape_html(url),
    )
}

fn render_youtube(url: &str, config: &EmbedConfig, id: &str) -> String {
    let Some(caps) = YOUTUBE_ID_RE.captures(url) else {
        return r#"<div class="video-error">Error: Invalid YouTube URL</div>"#.to_owned();
    };

    let mut params = String::new();
    if config.has("autoplay") {
        params.push_str("&autoplay=1&mute=1");
    } else if config.has("muted") {
        params.push_str("&mute=1");
    }
    if config.has("loop") {
        params.push_str("&loop=1");
    }
    if !config.controls_enabled() {
        params.push_str("&controls=0");
    }
    if let Some(start) = config.get("start") {
        params.push_str(&format!("&start={start}"));
    }

    let embed_url = format!("https://www.youtube.com/embed/{}?{params}", &caps[1]);
    let body = format!(
        r#"<iframe src="{}" width="{}" height="{}" frameborder="0" allowfullscreen allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"></iframe>"#,
        escape_html(&embed_url),
        escape_html(config.get_or("width", "100%")),
        escape_html(config.get_or("height", "400")),
    );
    component_frame(id, "mdoc-video", "YouTube Video", url, &body)
}

fn render_vimeo(url: &str, config: &EmbedConfig, id: &str) -> String {
    let Some(caps) = VIMEO_ID_RE.captures(url) else {
        return r#"<div class="video-error">Error: Invalid Vimeo URL</div>"#.to_owned();
    };

    let mut params = String::new();
    if config.has("autoplay") {
        params.push_str("&autoplay=1&muted=1");
    } else if config.has("muted") {
        params.push_str("&muted=1");
    }
    if config.has("loop") {
        params.push_str("&loop=1");
    }

    let embed_url = format!("https://player.vimeo.com/video/{}?{params}", &caps[1]);
    let body = format!(
        r#"<iframe src="{}" width="{}" height="{}" frameborder="0" allowfullscreen></iframe>"#,
        escape_html(&embed_url),
        escape_html(config.get_or("width", "100%")),
        escape_html(config.get_or("height", "400")),
    );
    component_frame(id, "mdoc-video", "Vimeo Video", url, &body)
}

fn render_twitch(url: &str, config: &EmbedConfig, id: &str) -> String {
    let parent = config.get_or("domain", "localhost");
    let embed_url = if url.contains("/videos/") {
        match TWITCH_VIDEO_RE.captures(url) {
            Some(caps) => format!("https://player.twitch.tv/?video={}&parent={parent}", &caps[1]),
            None => {
                return r#"<div class="video-error">Error: Invalid Twitch video URL</div>"#
                    .to_owned();
            }
        }
    } else {
        match TWITCH_CHANNEL_RE.captures(url) {
            Some(caps) => {
                format!("https://player.twitch.tv/?channel={}&parent={parent}", &caps[1])
            }
            None => {
                return r#"<div class="video-error">Error: Invalid Twitch channel URL</div>"#
                    .to_owned();
            }
        }
    };

    let body = format!(
        r#"<iframe src="{}" width="{}" height="{}" frameborder="0" allowfullscreen></iframe>"#,
        escape_html(&embed_url),
        escape_html(config.get_or("width", "100%")),
        escape_html(config.get_or("height", "400")),
    );
    component_frame(id, "mdoc-video", "Twitch Stream", url, &body)
}

fn render_native_video(url: &str, config: &EmbedConfig, id: &str) -> String {
    let mut flags = String::new();
    if config.controls_enabled() {
        flags.push_str(" controls");
    }
    if config.has("autoplay") {
        flags.push_str(" autoplay muted");
    } else if config.has("muted") {
        flags.push_str(" muted");
    }
    if config.has("loop") {
        flags.push_str(" loop");
    }
    let poster = match config.get("poster") {
        Some(poster) => format!(r#" poster="{}""#, escape_html(poster)),
        None => String::new(),
    };

    let src = escape_html(url);
    let body = format!(
        r#"<video width="{}" height="{}"{flags}{poster}>
            <source src="{src}" type="video/mp4">
            <source src="{src}" type="video/webm">
            <source src="{src}" type="video/ogg">
            Your browser does not support the video tag.
        </video>"#,
        escape_html(config.get_or("width", "100%")),
        escape_html(config.get_or("height", "400")),
    );
    component_frame(id, "mdoc-video", "Video", url, &body)
}

fn render_iframe(config: &EmbedConfig, index: usize) -> String {
    let Some(url) = config.get("url") else {
        return r#"<div class="iframe-error">Error: No URL provided</div>"#.to_owned();
    };
    let id = format!("iframe-{index}");
    let title = escape_html(config.get_or("title", "Embedded Content"));

    let sandbox: Vec<&str> = ["allow-scripts", "allow-forms", "allow-same-origin", "allow-popups"]
        .into_iter()
        .filter(|flag| config.has(flag))
        .collect();
    let sandbox_attr = if sandbox.is_empty() {
        String::new()
    } else {
        format!(r#" sandbox="{}""#, sandbox.join(" "))
    };

    let allow: Vec<&str> = ["fullscreen", "camera", "microphone", "geolocation"]
        .into_iter()
        .filter(|feature| config.has(feature))
        .collect();
    let allow_attr = if allow.is_empty() {
        String::new()
    } else {
        format!(r#" allow="{}""#, allow.join("; "))
    };

    let body = format!(
        r#"<iframe src="{}" width="{}" height="{}" frameborder="0"{sandbox_attr}{allow_attr} loading="lazy"></iframe>"#,
        escape_html(url),
        escape_html(config.get_or("width", "100%")),
        escape_html(config.get_or("height", "400")),
    );

    format!(
        r#"<div class="mdoc-iframe" id="{id}">
    <div class="component-header">
        <span>{title}</span>
        <a href="{}" target="_blank" class="iframe-external-link">↗</a>
    </div>
    <div class="component-body">
        {body}
    </div>
</div>"#,
        escape_html(url),
    )
}
