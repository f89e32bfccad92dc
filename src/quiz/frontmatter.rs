use log::warn;
use regex::Regex;
use serde_yaml_ng::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::question::{AnswerKey, Question, QuestionKind};

static FRONTMATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\x{FEFF}?---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)").unwrap()
});

/// Splits a document into its front matter block (without the `---`
/// fences) and the body that follows it.
pub fn split(text: &str) -> (Option<&str>, &str) {
    match FRONTMATTER.captures(text) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.end());
            let meta = caps.get(1).map_or("", |m| m.as_str());
            (Some(meta), &text[whole..])
        }
        None => (None, text),
    }
}

/// Builds a question from a markdown document. Never fails: bad or missing
/// metadata degrades to an unanswerable single-choice question.
pub fn parse_question(text: &str, origin: &str) -> Question {
    let (meta, body) = split(text);

    let meta = match meta.map(serde_yaml_ng::from_str::<Value>) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            warn!("[Load] {}: unreadable front matter ({}), using defaults", origin, e);
            Value::Null
        }
        None => {
            warn!("[Load] {}: no front matter, using defaults", origin);
            Value::Null
        }
    };

    let raw_type = get_string(&meta, "type").unwrap_or_default();
    let kind = QuestionKind::parse(&raw_type).unwrap_or_else(|| {
        warn!(
            "[Load] {}: unknown question type '{}', treating as single-choice",
            origin, raw_type
        );
        QuestionKind::Single
    });

    let answers = get_list(&meta, "correctAnswer");
    let options = get_list(&meta, "options");

    let key = match kind {
        QuestionKind::Single => AnswerKey::Single(match answers.as_slice() {
            [only] if !only.is_empty() => Some(only.clone()),
            _ => None,
        }),
        QuestionKind::Multi => {
            // `correctAnswer: []` means "select nothing", unlike a missing key
            let explicit_none = matches!(
                meta.get("correctAnswer"),
                Some(Value::Sequence(items)) if items.is_empty()
            );
            let set: BTreeSet<String> = answers.into_iter().filter(|a| !a.is_empty()).collect();
            AnswerKey::Multi(if set.is_empty() && !explicit_none {
                None
            } else {
                Some(set)
            })
        }
    };

    let question = Question {
        content: body.to_string(),
        key,
        options,
    };
    if !question.is_answerable() {
        warn!("[Load] {}: answer key does not match the options", origin);
    }
    question
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn get_string(meta: &Value, field: &str) -> Option<String> {
    meta.get(field).and_then(scalar)
}

// a scalar counts as a one-element list
fn get_list(meta: &Value, field: &str) -> Vec<String> {
    match meta.get(field) {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar).collect(),
        Some(other) => scalar(other).into_iter().collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::question::Selection;

    #[test]
    fn splits_front_matter_from_body() {
        let doc = "---\ntype: radio\n---\n# Title\n\nBody\n";
        let (meta, body) = split(doc);
        assert_eq!(meta, Some("type: radio"));
        assert_eq!(body, "# Title\n\nBody\n");
    }

    #[test]
    fn no_front_matter_keeps_whole_text() {
        let doc = "# Just content\n---\nnot metadata\n";
        assert_eq!(split(doc), (None, doc));
    }

    #[test]
    fn empty_front_matter_and_crlf() {
        assert_eq!(split("---\n---\nbody"), (Some(""), "body"));
        assert_eq!(split("---\r\na: 1\r\n---\r\nbody"), (Some("a: 1"), "body"));
    }

    #[test]
    fn parses_multi_choice() {
        let doc = "---\ntype: multi-choice\ncorrectAnswer: [Rust, Go]\n\
                   options:\n  - Rust\n  - Go\n  - Perl\n---\nPick the compiled ones.\n";
        let q = parse_question(doc, "q.md");
        assert_eq!(q.kind(), QuestionKind::Multi);
        assert_eq!(
            q.key,
            AnswerKey::Multi(Some(["Go", "Rust"].iter().map(|s| s.to_string()).collect()))
        );
        assert_eq!(q.options, vec!["Rust", "Go", "Perl"]);
        assert_eq!(q.content, "Pick the compiled ones.\n");
    }

    #[test]
    fn numbers_are_stringified() {
        let doc = "---\ntype: single-choice\ncorrectAnswer: 4\noptions: [3, 4, 5]\n---\n2 + 2?";
        let q = parse_question(doc, "q.md");
        assert_eq!(q.key, AnswerKey::Single(Some("4".to_string())));
        assert!(q.is_answerable());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let q = parse_question("---\ntitle: nothing useful\n---\nbody", "q.md");
        assert_eq!(q.kind(), QuestionKind::Single);
        assert_eq!(q.key, AnswerKey::Single(None));
        assert!(q.options.is_empty());
        assert_eq!(q.content, "body");
    }

    #[test]
    fn empty_multi_key_expects_no_selection() {
        let doc = "---\ntype: checkbox\ncorrectAnswer: []\noptions: [a, b]\n---\nNone apply.";
        let q = parse_question(doc, "q.md");
        assert_eq!(q.key, AnswerKey::Multi(Some(BTreeSet::new())));
        assert!(q.is_answerable());
        assert!(q.is_correct(&q.empty_selection()));
        assert!(!q.is_correct(&Selection::Multi(BTreeSet::from(["a".to_string()]))));

        let missing = parse_question("---\ntype: checkbox\noptions: [a, b]\n---\n", "q.md");
        assert_eq!(missing.key, AnswerKey::Multi(None));
        let blank = parse_question("---\ntype: checkbox\ncorrectAnswer: [\"\"]\n---\n", "q.md");
        assert_eq!(blank.key, AnswerKey::Multi(None));
    }

    #[test]
    fn broken_yaml_degrades() {
        let q = parse_question("---\ntype: [unclosed\n---\nbody", "q.md");
        assert_eq!(q.key, AnswerKey::Single(None));
        assert_eq!(q.content, "body");
    }

    #[test]
    fn single_choice_with_list_key_is_unanswerable() {
        let doc = "---\ntype: radio\ncorrectAnswer: [a, b]\noptions: [a, b]\n---\n";
        assert_eq!(parse_question(doc, "q.md").key, AnswerKey::Single(None));
    }
}
