//! Render pipeline: rewrite markup text into preview HTML.
//!
//! The stages run in a fixed order and later stages rely on earlier ones:
//! 1. image sentinel lines become `<img>` elements
//! 2. `<link=URL>TEXT</link>` becomes an anchor (before line breaks, so the
//!    link text may span lines)
//! 3. newlines become `<br>`
//! 4. double spaces become `&nbsp;&nbsp;`
//! 5. `<b>`/`<i>` become `<strong>`/`<em>`
//! 6. `<size=N>`/`<size=N%>` become font-size spans
//! 7. `<color=V>` becomes a color span
//!
//! Malformed or unbalanced markup is left as literal text. By default only
//! image URLs are escaped; [`RenderOptions::escape_text`] escapes all literal
//! text as well.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::registry::{IMAGE_SENTINEL, link_url_re};

const LINK_REPLACEMENT: &str =
    r#"<a href="${1}" target="_blank" style="text-decoration:underline">${2}</a>"#;

const COLOR_REPLACEMENT: &str = r#"<span style="color:${1}">"#;

/// Preview rendering options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Escape `&`, `<` and `>` in all text that is not a recognized markup
    /// token, sanitize image URLs, and leave links whose URL is not
    /// `http`, `https` or `ftp` as literal text. Off by default, which keeps the
    /// legacy preview output byte for byte.
    pub escape_text: bool,
}

impl RenderOptions {
    pub fn escaped() -> Self {
        Self { escape_text: true }
    }
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<link=([^>]+)>([^<]+)</link>").unwrap())
}

fn newline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n").unwrap())
}

fn size_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<size=([0-9.]+)(%?)>").unwrap())
}

fn color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<color=(#[0-9a-fA-F]{6}|[a-zA-Z]+)>").unwrap())
}

/// Tokens the pipeline turns into HTML; everything else is literal text.
fn markup_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"</?[bi]>",
            r"|<size=[0-9.]+%?>|</size>",
            r"|<color=(?:#[0-9a-fA-F]{6}|[a-zA-Z]+)>|</color>",
            r"|<link=[^>]+>|</link>",
        ))
        .unwrap()
    })
}

fn url_disallowed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=]").unwrap())
}

/// Render `text` with the default (compatible) options.
pub fn render(text: &str) -> String {
    render_with(text, &RenderOptions::default())
}

/// Render `text` into preview HTML.
pub fn render_with(text: &str, options: &RenderOptions) -> String {
    let html = text
        .split('\n')
        .map(|line| render_line(line, options))
        .collect::<Vec<_>>()
        .join("\n");

    let html = link_re().replace_all(&html, LINK_REPLACEMENT).into_owned();
    let html = newline_re().replace_all(&html, "<br>").into_owned();
    let html = html
        .replace("  ", "&nbsp;&nbsp;")
        .replace("<b>", "<strong>")
        .replace("</b>", "</strong>")
        .replace("<i>", "<em>")
        .replace("</i>", "</em>");
    let html = size_re()
        .replace_all(&html, |caps: &Captures<'_>| {
            let px = font_size_px(&caps[1], !caps[2].is_empty());
            format!(r#"<span style="font-size:{px}">"#)
        })
        .replace("</size>", "</span>");
    let html = color_re()
        .replace_all(&html, COLOR_REPLACEMENT)
        .replace("</color>", "</span>");

    tracing::trace!(
        target: "richtag::render",
        input_len = text.len(),
        output_len = html.len(),
        escaped = options.escape_text,
        "rendered preview"
    );
    html
}

/// Image sentinel lines are recognized after trimming, and the URL is the
/// trimmed remainder after `$img:`. The legacy preview sliced a fixed five
/// characters off the untrimmed line, which garbled indented sentinels.
fn render_line<'a>(line: &'a str, options: &RenderOptions) -> Cow<'a, str> {
    if let Some(url) = line.trim().strip_prefix(IMAGE_SENTINEL) {
        let url = url.trim();
        let src = if options.escape_text {
            sanitize_url(url)
        } else {
            url.replace('&', "&amp;").replace('<', "&lt;")
        };
        return Cow::Owned(format!(
            r#"<img src="{src}" style="max-width:100%;height:auto;display:block">"#
        ));
    }
    if options.escape_text {
        Cow::Owned(escape_literal_text(line))
    } else {
        Cow::Borrowed(line)
    }
}

/// Escape everything in `line` except recognized markup tokens.
fn escape_literal_text(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for found in markup_token_re().find_iter(line) {
        push_escaped(&mut out, &line[last..found.start()]);
        let token = found.as_str();
        match link_target(token) {
            // Unsupported schemes never become anchors.
            Some(url) if !link_url_re().is_match(url) => push_escaped(&mut out, token),
            // The URL ends up inside an attribute.
            Some(_) => out.push_str(&token.replace('"', "&quot;")),
            None => out.push_str(token),
        }
        last = found.end();
    }
    push_escaped(&mut out, &line[last..]);
    out
}

fn link_target(token: &str) -> Option<&str> {
    token.strip_prefix("<link=")?.strip_suffix('>')
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Pixel value for a size argument.
///
/// Percentages are divided by 5 after reading the longest numeric prefix
/// (`NaN` when there is none); other values are used verbatim.
fn font_size_px(value: &str, percent: bool) -> String {
    if !percent {
        return format!("{value}px");
    }
    match leading_number(value) {
        Some(n) => format!("{}px", js_number(n / 5.0)),
        None => "NaNpx".to_string(),
    }
}

/// Format a non-negative float the way a JavaScript template literal does:
/// exponent form below `1e-6` and from `1e21` up, plain decimals otherwise.
fn js_number(n: f64) -> String {
    if n.is_infinite() {
        return "Infinity".to_string();
    }
    if n == 0.0 || (1e-6..1e21).contains(&n) {
        return n.to_string();
    }
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

fn leading_number(value: &str) -> Option<f64> {
    let digits_end = |s: &str| s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let mut end = digits_end(value);
    if value[end..].starts_with('.') {
        end += 1 + digits_end(&value[end + 1..]);
    }
    let number = &value[..end];
    if !number.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    number.parse().ok()
}

/// Strip characters outside the RFC 3986 set and escape `&`.
pub fn sanitize_url(url: &str) -> String {
    url_disallowed_re().replace_all(url, "").replace('&', "&amp;")
}
