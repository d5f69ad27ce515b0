pub mod question;
pub mod video;
pub mod vocab;

pub use question::{QuestionRecord, ScrapeReport, NO_QUESTION_TEXT};
pub use video::{TranscriptSegment, VideoDescriptor};
pub use vocab::{QuizItem, QuizOptions, VocabEntry};
