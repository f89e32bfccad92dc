use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuestionKind {
    #[serde(rename = "single-choice")]
    Single,
    #[serde(rename = "multi-choice")]
    Multi,
}

impl QuestionKind {
    /// Maps a front-matter `type` value; `None` for anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "single-choice" | "single" | "radio" => Some(QuestionKind::Single),
            "multi-choice" | "multiple-choice" | "multi" | "checkbox" => Some(QuestionKind::Multi),
            _ => None,
        }
    }
}

/// Answer key, shaped by the question type. `None` means the source file
/// did not provide a usable key and the question can never be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKey {
    Single(Option<String>),
    Multi(Option<BTreeSet<String>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// markdown/HTML body, untrusted
    pub content: String,

    pub key: AnswerKey,

    /// display order
    pub options: Vec<String>,
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self.key {
            AnswerKey::Single(_) => QuestionKind::Single,
            AnswerKey::Multi(_) => QuestionKind::Multi,
        }
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }

    /// True when a key exists and every value in it can be selected.
    pub fn is_answerable(&self) -> bool {
        match &self.key {
            AnswerKey::Single(Some(correct)) => self.has_option(correct),
            AnswerKey::Multi(Some(correct)) => correct.iter().all(|c| self.has_option(c)),
            _ => false,
        }
    }

    pub fn empty_selection(&self) -> Selection {
        match self.kind() {
            QuestionKind::Single => Selection::Single(None),
            QuestionKind::Multi => Selection::Multi(BTreeSet::new()),
        }
    }

    pub fn is_correct(&self, selection: &Selection) -> bool {
        match (&self.key, selection) {
            (AnswerKey::Single(Some(correct)), Selection::Single(Some(chosen))) => {
                correct == chosen
            }
            (AnswerKey::Multi(Some(correct)), Selection::Multi(chosen)) => correct == chosen,
            _ => false,
        }
    }
}

/// The user's in-progress answer for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(Option<String>),
    Multi(BTreeSet<String>),
}

impl Selection {
    pub fn is_selected(&self, value: &str) -> bool {
        match self {
            Selection::Single(chosen) => chosen.as_deref() == Some(value),
            Selection::Multi(chosen) => chosen.contains(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Single(chosen) => chosen.is_none(),
            Selection::Multi(chosen) => chosen.is_empty(),
        }
    }

    /// Single selections are replaced, multi selections toggle membership.
    pub(crate) fn apply(&mut self, value: &str) {
        match self {
            Selection::Single(chosen) => *chosen = Some(value.to_string()),
            Selection::Multi(chosen) => {
                if !chosen.remove(value) {
                    chosen.insert(value.to_string());
                }
            }
        }
    }
}
