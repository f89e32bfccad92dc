use anyhow::Context;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::editor::DEFAULT_CHAR_LIMIT;
use crate::quiz::{RetakePolicy, ScoreBands, Source, DEFAULT_QUIZ_FILES};

const DEFAULT_BASE: &str = "public";
const DEFAULT_NOTES_PATH: &str = "notes.json";

/// Settings read from the environment (and `.env`), later overridden by
/// command line flags.
#[derive(Debug, Clone)]
pub struct Config {
    /// directory or URL the quiz files are resolved against
    pub base: String,
    pub quiz_files: Vec<String>,
    pub pass_score: usize,
    pub borderline_score: usize,
    pub retake: RetakePolicy,
    pub notes_path: PathBuf,
    pub char_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE.to_string(),
            quiz_files: DEFAULT_QUIZ_FILES.iter().map(|f| f.to_string()).collect(),
            pass_score: 4,
            borderline_score: 3,
            retake: RetakePolicy::default(),
            notes_path: PathBuf::from(DEFAULT_NOTES_PATH),
            char_limit: DEFAULT_CHAR_LIMIT,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(base) = lookup("QUIZ_BASE") {
            config.base = base;
        }
        if let Some(files) = lookup("QUIZ_FILES") {
            config.quiz_files = files
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(score) = parsed(&lookup, "QUIZ_PASS_SCORE")? {
            config.pass_score = score;
        }
        if let Some(score) = parsed(&lookup, "QUIZ_BORDERLINE_SCORE")? {
            config.borderline_score = score;
        }
        if let Some(policy) = lookup("QUIZ_RETAKE") {
            config.retake = RetakePolicy::from_str(&policy)
                .map_err(anyhow::Error::msg)
                .context("invalid QUIZ_RETAKE")?;
        }
        if let Some(path) = lookup("NOTES_PATH") {
            config.notes_path = PathBuf::from(path);
        }
        if let Some(limit) = parsed(&lookup, "EDITOR_CHAR_LIMIT")? {
            config.char_limit = limit;
        }

        Ok(config)
    }

    pub fn sources(&self) -> Vec<Source> {
        self.quiz_files
            .iter()
            .map(|file| Source::resolve(&self.base, file))
            .collect()
    }

    pub fn score_bands(&self) -> ScoreBands {
        ScoreBands::with_scores(self.pass_score, self.borderline_score)
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|value| value.trim().parse::<T>())
        .transpose()
        .context(format!("{} must be a non-negative number", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.quiz_files.len(), 5);
        assert_eq!(
            config.sources()[0],
            Source::resolve("public", "/questions/question1.md")
        );
        assert_eq!(config.retake, RetakePolicy::BelowPass);
        assert_eq!(config.char_limit, 1000);
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            ("QUIZ_BASE", "https://example.org"),
            ("QUIZ_FILES", "a.md, b.md,,"),
            ("QUIZ_PASS_SCORE", "8"),
            ("QUIZ_RETAKE", "always"),
            ("EDITOR_CHAR_LIMIT", "50"),
        ]))
        .unwrap();
        assert_eq!(
            config.sources(),
            vec![
                Source::Url("https://example.org/a.md".to_string()),
                Source::Url("https://example.org/b.md".to_string()),
            ]
        );
        assert_eq!(config.pass_score, 8);
        assert_eq!(config.retake, RetakePolicy::Always);
        assert_eq!(config.char_limit, 50);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = Config::from_lookup(lookup(&[("QUIZ_PASS_SCORE", "lots")])).unwrap_err();
        assert!(err.to_string().contains("QUIZ_PASS_SCORE"));
        assert!(Config::from_lookup(lookup(&[("QUIZ_RETAKE", "never")])).is_err());
    }
}
