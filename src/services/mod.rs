pub mod llm_service;
pub mod ollama_service;
pub mod question_extractor;
pub mod skip_writer;
pub mod stat_parser;
pub mod transcript_service;
pub mod vocab_service;
pub mod youtube_service;

pub use llm_service::{build_backend, LlmBackend, LlmService};
pub use ollama_service::OllamaService;
pub use question_extractor::QuestionExtractor;
pub use skip_writer::SkipWriter;
pub use transcript_service::TranscriptService;
pub use vocab_service::VocabService;
pub use youtube_service::YouTubeService;
