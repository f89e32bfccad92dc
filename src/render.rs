//! Terminal rendering for untrusted markdown/HTML.
//!
//! Content is never printed as-is. HTML is first reduced to an allow-list
//! of formatting tags with every attribute stripped, the surviving tags are
//! rewritten into their markdown equivalents, and the result goes through a
//! small markdown renderer that emits `colored` styles.

use colored::Colorize;
use regex::{Captures, Regex};
use std::sync::LazyLock;

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "b", "strong", "i", "em", "u", "code", "pre", "ul", "ol", "li", "h1", "h2", "h3",
    "h4", "h5", "h6", "blockquote", "hr",
];

// elements dropped together with everything inside them
const DROPPED_ELEMENTS: &[&str] = &["script", "style", "iframe", "object", "embed", "template"];

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").unwrap());

static DROPPED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DROPPED_ELEMENTS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(?:.*?</{tag}\s*>|.*\z)")).unwrap()
        })
        .collect()
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").unwrap());
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").unwrap());
static NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d+)[.)]\s+(.*)$").unwrap());
static QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*>\s?(.*)$").unwrap());
static RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").unwrap());
static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(?:```|~~~)").unwrap());

static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([^`]+)`|\*\*(.+?)\*\*|__(.+?)__|\*([^*\s](?:[^*]*[^*\s])?)\*|\b_([^_]+)_\b")
        .unwrap()
});

/// Removes everything but the allow-listed formatting tags. Kept tags lose
/// all of their attributes.
pub fn sanitize_html(input: &str) -> String {
    let mut text = COMMENT.replace_all(input, "").into_owned();
    for element in DROPPED.iter() {
        text = element.replace_all(&text, "").into_owned();
    }

    TAG.replace_all(&text, |caps: &Captures| {
        let name = caps[2].to_ascii_lowercase();
        if ALLOWED_TAGS.contains(&name.as_str()) {
            format!("<{}{}>", &caps[1], name)
        } else {
            String::new()
        }
    })
    .into_owned()
}

/// Drops control characters other than newlines and tabs, so content
/// cannot smuggle terminal escape sequences.
pub fn strip_controls(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Renders markdown (which may embed HTML) for the terminal.
pub fn render_markdown(input: &str) -> String {
    let markdown = html_to_markdown(&sanitize_html(&strip_controls(input)));
    decode_entities(render_lines(&markdown).trim_end_matches('\n'))
}

/// Renders an HTML fragment for the terminal. Source line breaks are not
/// significant, as in a browser.
pub fn render_html(input: &str) -> String {
    let collapsed = WHITESPACE.replace_all(input, " ");
    let collapsed = strip_controls(&collapsed);
    let markdown = html_to_markdown(&sanitize_html(&collapsed));
    let mut lines: Vec<&str> = markdown.lines().map(str::trim).collect();
    lines.dedup_by(|a, b| a.is_empty() && b.is_empty());
    decode_entities(render_lines(&lines.join("\n")).trim_matches('\n'))
}

// expects sanitized input, so only allow-listed tags without attributes remain
fn html_to_markdown(html: &str) -> String {
    TAG.replace_all(html, |caps: &Captures| {
        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        match (name.as_str(), closing) {
            ("br", _) => "\n".to_string(),
            ("hr", _) => "\n---\n".to_string(),
            ("b" | "strong", _) => "**".to_string(),
            ("i" | "em", _) => "*".to_string(),
            ("code", _) => "`".to_string(),
            ("li", false) => "\n- ".to_string(),
            ("blockquote", false) => "\n> ".to_string(),
            (h, false) if h.len() == 2 && h.starts_with('h') => {
                let level = h[1..].parse::<usize>().unwrap_or(1);
                format!("\n{} ", "#".repeat(level))
            }
            ("p" | "pre" | "ul" | "ol", false) => "\n".to_string(),
            (_, true) => "\n".to_string(),
            _ => String::new(),
        }
    })
    .into_owned()
}

fn render_lines(markdown: &str) -> String {
    let mut out = Vec::new();
    let mut in_code = false;

    for line in markdown.lines() {
        if FENCE.is_match(line) {
            in_code = !in_code;
            continue;
        }
        if in_code {
            out.push(format!("    {}", line.dimmed()));
            continue;
        }

        let rendered = if RULE.is_match(line) {
            "─".repeat(40).dimmed().to_string()
        } else if let Some(caps) = HEADING.captures(line) {
            let text = render_inline(&caps[2]);
            if caps[1].len() == 1 {
                text.bold().underline().to_string()
            } else {
                text.bold().to_string()
            }
        } else if let Some(caps) = BULLET.captures(line) {
            format!("  • {}", render_inline(&caps[1]))
        } else if let Some(caps) = NUMBERED.captures(line) {
            format!("  {}. {}", &caps[1], render_inline(&caps[2]))
        } else if let Some(caps) = QUOTE.captures(line) {
            format!("  │ {}", render_inline(&caps[1]).italic())
        } else {
            render_inline(line)
        };
        out.push(rendered);
    }

    out.join("\n")
}

fn render_inline(text: &str) -> String {
    INLINE
        .replace_all(text, |caps: &Captures| {
            if let Some(code) = caps.get(1) {
                code.as_str().cyan().to_string()
            } else if let Some(bold) = caps.get(2).or_else(|| caps.get(3)) {
                bold.as_str().bold().to_string()
            } else if let Some(italic) = caps.get(4).or_else(|| caps.get(5)) {
                italic.as_str().italic().to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn strips_scripts_and_attributes() {
        let html = r#"<p onclick="steal()">Hi <script>alert(1)</script><b class="x">there</b><img src=x onerror=y></p>"#;
        assert_eq!(sanitize_html(html), "<p>Hi <b>there</b></p>");
    }

    #[test]
    fn unclosed_script_swallows_the_rest() {
        assert_eq!(sanitize_html("safe<script>evil();"), "safe");
    }

    #[test]
    fn drops_comments_and_unknown_tags() {
        assert_eq!(
            sanitize_html("<!-- hidden --><div><a href='javascript:x'>link</a></div>"),
            "link"
        );
    }

    #[test]
    fn keeps_plain_comparisons() {
        assert_eq!(sanitize_html("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
    }

    #[test]
    fn strips_escape_sequences() {
        assert_eq!(strip_controls("a\x1b[2Jb\r\nc\td"), "a[2Jb\nc\td");
    }

    #[test]
    fn markdown_blocks() {
        plain();
        assert_eq!(
            render_markdown("# Title\n\n- one\n- **two**\n1. first\n> quoted\n"),
            "Title\n\n  • one\n  • two\n  1. first\n  │ quoted"
        );
    }

    #[test]
    fn markdown_inline() {
        plain();
        assert_eq!(
            render_markdown("Use `let x` with *care* and __force__"),
            "Use let x with care and force"
        );
    }

    #[test]
    fn code_fences_are_verbatim() {
        plain();
        assert_eq!(render_markdown("```\n# not a heading\n```"), "    # not a heading");
    }

    #[test]
    fn html_fragment() {
        plain();
        assert_eq!(
            render_html("<h2>Question</h2>\n<ul>\n  <li>a</li>\n  <li>b &amp; c</li>\n</ul>"),
            "Question\n\n  • a\n\n  • b & c"
        );
    }

    #[test]
    fn html_ignores_source_newlines() {
        plain();
        assert_eq!(render_html("<p>Hello\nworld</p>"), "Hello world");
    }
}
