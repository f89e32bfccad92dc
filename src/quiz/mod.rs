mod fetch;
mod frontmatter;
mod machine;
mod question;
mod score;

pub use fetch::{load_questions, Fetch, Fetcher, RequestError, Source, DEFAULT_QUIZ_FILES};
pub use frontmatter::{parse_question, split as split_frontmatter};
pub use machine::{Phase, Quiz, QuizError, Verdict};
pub use question::{AnswerKey, Question, QuestionKind, Selection};
pub use score::{Band, Outcome, RetakePolicy, ScoreBands};
