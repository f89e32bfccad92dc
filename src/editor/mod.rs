mod draft;
mod store;

pub use draft::{contains_markdown, preview, Draft, LimitExceeded, DEFAULT_CHAR_LIMIT};
pub use store::{NoteStore, SAVED_TEXT_KEY};
