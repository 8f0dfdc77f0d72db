//! HTML detection and plain-text normalization.

use regex::Regex;
use std::sync::OnceLock;

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"))
}

fn style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"))
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"))
}

fn block_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)</(p|div|h[1-6]|li|tr|section|article|blockquote)>|<br\s*/?>")
            .expect("valid regex")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("valid regex"))
}

/// Whether fetched content should be treated as HTML, by URL extension or
/// content sniffing.
pub fn looks_like_html(url: &str, content: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if path.ends_with(".html") || path.ends_with(".htm") {
        return true;
    }
    let head = content.get(..1024).unwrap_or(content);
    head.contains("<!DOCTYPE html") || head.contains("<!doctype html") || head.contains("<html")
}

/// Convert HTML to plain text: scripts, styles, and comments dropped,
/// block boundaries turned into newlines, remaining tags stripped, and
/// common entities decoded.
pub fn html_to_text(html: &str) -> String {
    let without_script = script_re().replace_all(html, "");
    let without_style = style_re().replace_all(&without_script, "");
    let without_comments = comment_re().replace_all(&without_style, "");
    let with_breaks = block_end_re().replace_all(&without_comments, "\n");
    let stripped = tag_re().replace_all(&with_breaks, " ");

    let decoded = decode_entities(&stripped);

    // Collapse intra-line whitespace and drop runs of blank lines
    let mut lines: Vec<String> = Vec::new();
    let mut last_blank = true;
    for line in decoded.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !last_blank {
                lines.push(String::new());
                last_blank = true;
            }
        } else {
            lines.push(collapsed);
            last_blank = false;
        }
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}

/// Decode the handful of entities that matter for review prose.
pub(crate) fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
}
