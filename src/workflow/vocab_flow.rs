//! 单字学习流程 - 流程层
//!
//! 核心职责：把"影片 → 字幕 → 单字（→ 练习题）"串起来，产出可投递的内容
//!
//! 三种入口：
//! 1. 聊天消息里的影片链接 → 前 10 个单字的文字回复
//! 2. 指定影片链接 → 单字 + 练习题邮件
//! 3. 每日任务：搜索最新影片，取第一部有字幕的 → 单字邮件

use std::fmt::Write as _;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::delivery::{render_quiz_digest, render_word_email};
use crate::models::{VideoDescriptor, VocabEntry};
use crate::services::{build_backend, TranscriptService, VocabService, YouTubeService};

/// 聊天回复中最多展示的单字数
pub const CHAT_WORD_LIMIT: usize = 10;

/// 聊天回复结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReplyOutcome {
    pub success: bool,
    pub message: String,
}

impl ChatReplyOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDigest {
    pub subject: String,
    pub html: String,
}

/// 聊天回复正文
pub fn format_chat_message(url: &str, title: &str, words: &[VocabEntry]) -> String {
    let mut message = format!("Video URL - {}\n\n影片标题：{}\n\n单字列表：\n", url, title);

    if words.is_empty() {
        message.push_str("未找到任何单字。");
        return message;
    }

    for (i, word) in words.iter().take(CHAT_WORD_LIMIT).enumerate() {
        let _ = write!(
            message,
            "\n{}. {} ({}) - {}\neg. {}\n",
            i + 1,
            word.word,
            word.part_of_speech,
            word.translation,
            word.example
        );
    }
    message
}

/// 单字学习流程
pub struct VocabFlow {
    youtube: YouTubeService,
    transcripts: TranscriptService,
    vocab: VocabService,
    search_query: String,
    max_results: u32,
}

impl VocabFlow {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(
            YouTubeService::new(config),
            TranscriptService::new(),
            VocabService::new(build_backend(config)),
            config,
        )
    }

    pub fn from_parts(
        youtube: YouTubeService,
        transcripts: TranscriptService,
        vocab: VocabService,
        config: &Config,
    ) -> Self {
        Self {
            youtube,
            transcripts,
            vocab,
            search_query: config.youtube_search_query.clone(),
            max_results: config.youtube_max_results,
        }
    }

    /// 取得影片信息和字幕，任一失败返回 `Err(原因)`
    async fn video_with_transcript(&self, url: &str) -> Result<(VideoDescriptor, String), &'static str> {
        let Some(video) = self.youtube.video_info_by_url(url).await else {
            return Err("无法获取影片信息");
        };
        let Some(transcript) = self.transcripts.fetch_text(&video.video_id).await else {
            return Err("无法获取影片字幕");
        };
        Ok((video, transcript))
    }

    /// 处理聊天消息中的影片链接
    pub async fn chat_reply_for_url(&self, url: &str) -> ChatReplyOutcome {
        info!("开始处理指定影片: {}", url);

        let (video, transcript) = match self.video_with_transcript(url).await {
            Ok(found) => found,
            Err(reason) => {
                error!("{}: {}", reason, url);
                return ChatReplyOutcome::failed(format!("处理影片时发生错误: {}", reason));
            }
        };

        let words = self.vocab.extract_words(&transcript, &video.title).await;
        ChatReplyOutcome {
            success: true,
            message: format_chat_message(url, &video.title, &words),
        }
    }

    /// 指定影片的单字 + 练习题邮件
    ///
    /// 任何一步没有结果都返回 `None`
    pub async fn digest_with_quiz(&self, url: &str) -> Option<EmailDigest> {
        let (video, transcript) = match self.video_with_transcript(url).await {
            Ok(found) => found,
            Err(reason) => {
                error!("{}: {}", reason, url);
                return None;
            }
        };

        let words = self.vocab.extract_words(&transcript, &video.title).await;
        if words.is_empty() {
            error!("无法提取单字");
            return None;
        }

        let quiz = self.vocab.generate_quiz(&words).await;
        if quiz.is_empty() {
            error!("无法生成考题");
            return None;
        }

        Some(EmailDigest {
            subject: format!("TOEIC 单字学习 - {}", video.title),
            html: render_quiz_digest(&video.title, &words, &quiz),
        })
    }

    /// 指定影片的单字邮件（不含练习题）
    pub async fn digest_for_url(&self, url: &str, date: &str) -> Option<EmailDigest> {
        let (video, transcript) = match self.video_with_transcript(url).await {
            Ok(found) => found,
            Err(reason) => {
                error!("{}: {}", reason, url);
                return None;
            }
        };
        self.word_digest(&video, &transcript, date).await
    }

    /// 每日任务：搜索最新影片，使用第一部有字幕的影片
    pub async fn daily_digest(&self, date: &str) -> Option<EmailDigest> {
        info!("开始执行每日单字提取任务...");
        let videos = self
            .youtube
            .search_videos(&self.search_query, self.max_results)
            .await;
        if videos.is_empty() {
            error!("没有找到任何影片");
            return None;
        }

        for video in &videos {
            info!("尝试影片: {}", video.title);
            match self.transcripts.fetch_text(&video.video_id).await {
                Some(transcript) => return self.word_digest(video, &transcript, date).await,
                None => warn!("影片 {} 没有字幕，尝试下一部", video.video_id),
            }
        }

        error!("所有影片都无法获取字幕");
        None
    }

    async fn word_digest(
        &self,
        video: &VideoDescriptor,
        transcript: &str,
        date: &str,
    ) -> Option<EmailDigest> {
        let words = self.vocab.extract_words(transcript, &video.title).await;
        if words.is_empty() {
            error!("无法提取单字");
            return None;
        }

        Some(EmailDigest {
            subject: format!("📚 每日 TOEIC 单字学习 - {}", date),
            html: render_word_email(&words, video, date),
        })
    }
}
