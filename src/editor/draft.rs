use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::render::{render_html, render_markdown};

pub const DEFAULT_CHAR_LIMIT: usize = 1000;

static MARKDOWN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)\*\*.*?\*\*|__.*?__|^\s*#{1,6}\s.*|`.*?`|^\s*-\s.*|^\s*\d+\.\s.*").unwrap()
});

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Character limit exceeded! ({attempted}/{limit})")]
pub struct LimitExceeded {
    pub attempted: usize,
    pub limit: usize,
}

/// Editable text with a hard character limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    text: String,
    limit: usize,
}

impl Draft {
    pub fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            limit,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Replaces the whole text. Refused if it would not fit.
    pub fn replace(&mut self, text: &str) -> Result<(), LimitExceeded> {
        self.fits(text.chars().count())?;
        self.text = text.to_string();
        Ok(())
    }

    /// Appends one line. Refused if it would not fit.
    pub fn push_line(&mut self, line: &str) -> Result<(), LimitExceeded> {
        let separator = usize::from(!self.text.is_empty());
        self.fits(self.chars() + separator + line.chars().count())?;
        if separator == 1 {
            self.text.push('\n');
        }
        self.text.push_str(line);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn preview(&self) -> String {
        preview(&self.text)
    }

    fn fits(&self, attempted: usize) -> Result<(), LimitExceeded> {
        if attempted > self.limit {
            return Err(LimitExceeded {
                attempted,
                limit: self.limit,
            });
        }
        Ok(())
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::new(DEFAULT_CHAR_LIMIT)
    }
}

pub fn contains_markdown(text: &str) -> bool {
    MARKDOWN.is_match(text)
}

/// Markdown is rendered as markdown; anything else is treated as HTML.
pub fn preview(text: &str) -> String {
    if contains_markdown(text) {
        render_markdown(text)
    } else {
        render_html(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_markdown() {
        assert!(contains_markdown("some **bold** text"));
        assert!(contains_markdown("# Heading"));
        assert!(contains_markdown("intro\n- item"));
        assert!(contains_markdown("1. first"));
        assert!(contains_markdown("call `f()`"));
        assert!(!contains_markdown("<p>Hello <b>world</b></p>"));
        assert!(!contains_markdown("plain text - with a dash"));
    }

    #[test]
    fn push_line_respects_limit() {
        let mut draft = Draft::new(10);
        draft.push_line("hello").unwrap();
        draft.push_line("four").unwrap();
        assert_eq!(draft.text(), "hello\nfour");
        assert_eq!(draft.chars(), 10);

        assert_eq!(
            draft.push_line("x"),
            Err(LimitExceeded {
                attempted: 12,
                limit: 10
            })
        );
        assert_eq!(draft.text(), "hello\nfour");
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let mut draft = Draft::new(3);
        assert!(draft.replace("日本語").is_ok());
        assert!(draft.replace("日本語!").is_err());
        assert_eq!(draft.text(), "日本語");
    }

    #[test]
    fn preview_picks_renderer() {
        colored::control::set_override(false);
        assert_eq!(preview("<p>a\nb</p>"), "a b");
        assert_eq!(preview("- a\n- b"), "  • a\n  • b");
    }
}
