use log::{debug, info, warn};
use thiserror::Error;

use super::question::{Question, Selection};
use super::score::{Outcome, RetakePolicy, ScoreBands};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Active,
    Submitted(Outcome),
    /// loaded, but there were no questions
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuizError {
    #[error("the quiz is not in progress")]
    NotActive,

    #[error("'{0}' is not one of the options")]
    UnknownOption(String),

    #[error("answer the current question correctly first")]
    NotCorrectYet,

    #[error("this is the last question, submit instead")]
    NoNextQuestion,

    #[error("submit is only available on the last question")]
    NotLastQuestion,

    #[error("a retake is not offered for this result")]
    RetakeUnavailable,

    #[error("questions have already been loaded")]
    AlreadyLoaded,
}

/// The quiz state machine. Every transition either applies completely or
/// returns an error and leaves the state untouched.
#[derive(Debug, Clone)]
pub struct Quiz {
    questions: Vec<Question>,
    phase: Phase,
    current: usize,
    selection: Selection,
    verdict: Verdict,
    score: usize,
    /// current question already counted towards `score`
    credited: bool,
    bands: ScoreBands,
    retake: RetakePolicy,
}

impl Default for Quiz {
    fn default() -> Self {
        Self::new(ScoreBands::default(), RetakePolicy::default())
    }
}

impl Quiz {
    pub fn new(bands: ScoreBands, retake: RetakePolicy) -> Self {
        Self {
            questions: Vec::new(),
            phase: Phase::Loading,
            current: 0,
            selection: Selection::Single(None),
            verdict: Verdict::Unknown,
            score: 0,
            credited: false,
            bands,
            retake,
        }
    }

    /// Feeds the loader's result in. A failed load keeps the quiz in
    /// `Phase::Loading` and hands the error back.
    pub fn populate(&mut self, loaded: anyhow::Result<Vec<Question>>) -> anyhow::Result<()> {
        if self.phase != Phase::Loading {
            return Err(QuizError::AlreadyLoaded.into());
        }
        match loaded {
            Ok(questions) => {
                self.load(questions);
                Ok(())
            }
            Err(e) => {
                warn!("[Quiz] Loading failed, staying in the loading state: {:#}", e);
                Err(e)
            }
        }
    }

    fn load(&mut self, questions: Vec<Question>) {
        self.questions = questions;
        if self.questions.is_empty() {
            info!("[Quiz] No questions found.");
            self.phase = Phase::NotFound;
            return;
        }
        debug!("[Quiz] Starting with {} questions.", self.questions.len());
        self.restart();
    }

    fn restart(&mut self) {
        self.phase = Phase::Active;
        self.current = 0;
        self.score = 0;
        self.enter_question();
    }

    fn enter_question(&mut self) {
        self.selection = self.questions[self.current].empty_selection();
        self.verdict = Verdict::Unknown;
        self.credited = false;
    }

    fn ensure_active(&self) -> Result<(), QuizError> {
        match self.phase {
            Phase::Active => Ok(()),
            _ => Err(QuizError::NotActive),
        }
    }

    pub fn select(&mut self, value: &str) -> Result<(), QuizError> {
        self.ensure_active()?;
        if !self.questions[self.current].has_option(value) {
            return Err(QuizError::UnknownOption(value.to_string()));
        }
        self.selection.apply(value);
        Ok(())
    }

    /// Compares the selection with the key and credits the score from that
    /// fresh result, at most once per question.
    pub fn check(&mut self) -> Result<Verdict, QuizError> {
        self.ensure_active()?;
        let correct = self.questions[self.current].is_correct(&self.selection);
        self.verdict = if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };
        if correct && !self.credited {
            self.credited = true;
            self.score += 1;
        }
        debug!(
            "[Quiz] Question {} checked: {:?}, score {}",
            self.current + 1,
            self.verdict,
            self.score
        );
        Ok(self.verdict)
    }

    pub fn next(&mut self) -> Result<(), QuizError> {
        self.ensure_active()?;
        if self.verdict != Verdict::Correct {
            return Err(QuizError::NotCorrectYet);
        }
        if self.is_last() {
            return Err(QuizError::NoNextQuestion);
        }
        self.current += 1;
        self.enter_question();
        Ok(())
    }

    pub fn submit(&mut self) -> Result<Outcome, QuizError> {
        self.ensure_active()?;
        if !self.is_last() {
            return Err(QuizError::NotLastQuestion);
        }
        let total = self.questions.len();
        let band = self.bands.classify(self.score, total);
        info!("[Quiz] Submitted with {}/{} ({:?}).", self.score, total, band);
        let outcome = Outcome {
            score: self.score,
            total,
            band,
            retake_offered: self.retake.allows(band),
        };
        self.phase = Phase::Submitted(outcome.clone());
        Ok(outcome)
    }

    pub fn retake(&mut self) -> Result<(), QuizError> {
        let offered = match &self.phase {
            Phase::Submitted(outcome) => outcome.retake_offered,
            _ => return Err(QuizError::NotActive),
        };
        if !offered {
            return Err(QuizError::RetakeUnavailable);
        }
        info!("[Quiz] Retaking.");
        self.restart();
        Ok(())
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The question being answered, while active.
    pub fn current(&self) -> Option<&Question> {
        match self.phase {
            Phase::Active => self.questions.get(self.current),
            _ => None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, Phase::Submitted(_))
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    pub fn can_advance(&self) -> bool {
        self.phase == Phase::Active && self.verdict == Verdict::Correct && !self.is_last()
    }

    /// Percentage through the quiz, counting the current question.
    pub fn progress(&self) -> Option<f64> {
        match self.phase {
            Phase::Active => {
                Some((self.current + 1) as f64 * 100.0 / self.questions.len() as f64)
            }
            _ => None,
        }
    }
}
