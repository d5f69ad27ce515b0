pub mod question_flow;
pub mod retry;
pub mod vocab_flow;

pub use question_flow::{BrowserFetcher, QuestionFetcher};
pub use retry::{retry_fixed, RetryPolicy};
pub use vocab_flow::{ChatReplyOutcome, EmailDigest, VocabFlow};
