use anyhow::{anyhow, Context};
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use thiserror::Error;

use super::frontmatter::parse_question;
use super::question::Question;

pub const DEFAULT_QUIZ_FILES: [&str; 5] = [
    "/questions/question1.md",
    "/questions/question2.md",
    "/questions/question3.md",
    "/questions/question4.md",
    "/questions/question5.md",
];

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("Failed to read response body: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Server returned an error: {status}")]
    ServerError { status: u16 },
}

/// Where a question file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// Resolves a quiz file name against a base directory or base URL.
    /// Absolute URLs are taken as they are.
    pub fn resolve(base: &str, file: &str) -> Self {
        if is_url(file) {
            return Source::Url(file.to_string());
        }
        let file = file.trim_start_matches('/');
        if is_url(base) {
            Source::Url(format!("{}/{}", base.trim_end_matches('/'), file))
        } else {
            Source::Path(Path::new(base).join(file))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Transport for raw question text.
pub trait Fetch: Sync {
    fn fetch(&self, source: &Source) -> Result<String, RequestError>;
}

/// Reads files from disk and URLs over HTTP.
#[derive(Debug, Default)]
pub struct Fetcher;

impl Fetch for Fetcher {
    fn fetch(&self, source: &Source) -> Result<String, RequestError> {
        match source {
            Source::Path(path) => Ok(std::fs::read_to_string(path)?),
            Source::Url(url) => {
                let response = ureq::get(url).call().map_err(|e| match e {
                    ureq::Error::Status(code, _) => RequestError::ServerError { status: code },
                    other => RequestError::HttpError(other),
                })?;
                Ok(response.into_string()?)
            }
        }
    }
}

/// Fetches and parses every source concurrently. The result keeps the
/// order of `sources`; any failed fetch fails the whole load.
pub fn load_questions<F: Fetch>(fetcher: &F, sources: &[Source]) -> anyhow::Result<Vec<Question>> {
    let now = Instant::now();

    let questions = thread::scope(|scope| {
        let workers: Vec<_> = sources
            .iter()
            .map(|source| {
                scope.spawn(move || {
                    fetcher
                        .fetch(source)
                        .map(|text| parse_question(&text, &source.to_string()))
                })
            })
            .collect();

        workers
            .into_iter()
            .zip(sources)
            .map(|(worker, source)| {
                worker
                    .join()
                    .map_err(|_| anyhow!("worker fetching {} panicked", source))?
                    .context(format!("failed to fetch question '{}'", source))
            })
            .collect::<anyhow::Result<Vec<Question>>>()
    })?;

    debug!(
        "[Load] Loaded {} questions in {} ms.",
        questions.len(),
        now.elapsed().as_millis()
    );
    Ok(questions)
}
