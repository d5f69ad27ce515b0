//! 单字抽取服务 - 业务能力层
//!
//! 只负责"字幕 → 单字列表"和"单字列表 → 练习题"两种能力。
//! 模型回复可能包在 ``` 代码块里，解析前先剥掉；任何失败都返回空列表。

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{error, info};

use crate::error::LlmError;
use crate::models::{QuizItem, VocabEntry};
use crate::services::LlmBackend;

/// 抽取的单字数量
pub const WORD_COUNT: usize = 50;

const SYSTEM_PROMPT: &str = "你是一位专业的英文老师，正在帮助学生准备 TOEIC 考试，目标是 990 分。";

/// 剥掉模型回复外层的代码块标记
///
/// - 含 "```json"：取其后到下一个 "```" 之间的内容
/// - 否则含 "```"：取第一个与最后一个 "```" 之间的内容
/// - 缺少结束标记时保留到文本末尾
pub fn strip_json_fence(text: &str) -> &str {
    const JSON_FENCE: &str = "```json";
    const FENCE: &str = "```";

    let inner = if let Some(start) = text.find(JSON_FENCE) {
        let body = &text[start + JSON_FENCE.len()..];
        match body.find(FENCE) {
            Some(end) => &body[..end],
            None => body,
        }
    } else if let Some(start) = text.find(FENCE) {
        let body_start = start + FENCE.len();
        match text.rfind(FENCE) {
            Some(end) if end >= body_start => &text[body_start..end],
            _ => &text[body_start..],
        }
    } else {
        text
    };

    inner.trim()
}

/// 解析单字列表，接受 `{"words": [...]}` 或裸数组
///
/// 单个单字格式错误时，错误信息指出具体字段
pub fn parse_words(response: &str) -> Result<Vec<VocabEntry>> {
    let json = strip_json_fence(response);
    let mut value: JsonValue = serde_json::from_str(json)?;
    let list = if value.is_object() {
        value
            .get_mut("words")
            .map(JsonValue::take)
            .ok_or(LlmError::MissingKey("words"))?
    } else {
        value
    };
    let words: Vec<VocabEntry> =
        serde_json::from_value(list).context("单字列表格式错误")?;
    Ok(words)
}

#[derive(Deserialize)]
struct QuizPayload {
    questions: Vec<QuizItem>,
}

/// 解析练习题列表，要求 `{"questions": [...]}`
pub fn parse_quiz(response: &str) -> Result<Vec<QuizItem>> {
    let json = strip_json_fence(response);
    let value: JsonValue = serde_json::from_str(json)?;
    if value.get("questions").is_none() {
        return Err(LlmError::MissingKey("questions").into());
    }
    let payload: QuizPayload = serde_json::from_value(value)?;
    Ok(payload.questions)
}

/// 构建抽取单字的提示词
pub fn build_words_prompt(transcript: &str, video_title: &str) -> String {
    format!(
        r#"### Goal
请从影片字幕中提取 {count} 个最适合 TOEIC 考试的重要英文单字；若超过 {count} 个，优先提供达到 990 分需要掌握的高级单字。

### Rules
1. 选择 TOEIC 考试中常出现的商业、科技、学术相关单字
2. 优先选择中高级难度的单字（不要太基础的如 "the"、"and"）
3. 包含不同词性（名词、动词、形容词、副词）
4. 每个单字提供：英文单字、中文意思、词性、例句

### Output
只返回 JSON：
{{
    "words": [
        {{
            "word": "management",
            "chinese": "管理",
            "part_of_speech": "noun",
            "example": "Good management is essential for business success."
        }}
    ]
}}

Video title: {title}
Video transcript: {transcript}
"#,
        count = WORD_COUNT,
        title = video_title,
        transcript = transcript
    )
}

/// 构建生成练习题的提示词
pub fn build_quiz_prompt(words: &[VocabEntry]) -> String {
    let word_list = serde_json::to_string_pretty(words).unwrap_or_default();
    format!(
        r#"请根据以下单字列表，为每个单字生成一道 TOEIC 风格的选择题。
每道题包含：
1. 题目（使用该单字或其变化形式）
2. 4 个选项（A、B、C、D）
3. 正确答案
4. 解释

单字列表：
{word_list}

只返回 JSON：
{{
    "questions": [
        {{
            "question": "The company's management team has decided to _____ the project due to budget constraints.",
            "options": {{
                "A": "terminate",
                "B": "initiate",
                "C": "celebrate",
                "D": "decorate"
            }},
            "correct_answer": "A",
            "explanation": "terminate 意为终止，符合句意。"
        }}
    ]
}}

要求：
1. 题目符合 TOEIC 考试的难度和风格
2. 选项合理且具有迷惑性
3. 解释清楚说明为什么是正确答案
"#
    )
}

/// 单字抽取服务
pub struct VocabService {
    backend: Arc<dyn LlmBackend>,
}

impl VocabService {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// 从字幕中抽取单字，失败时返回空列表
    pub async fn extract_words(&self, transcript: &str, video_title: &str) -> Vec<VocabEntry> {
        if transcript.trim().is_empty() {
            error!("字幕内容为空，无法提取单字");
            return Vec::new();
        }

        let prompt = build_words_prompt(transcript, video_title);
        let result = match self.backend.complete(&prompt, Some(SYSTEM_PROMPT)).await {
            Ok(response) => parse_words(&response),
            Err(e) => Err(e),
        };

        match result {
            Ok(words) => {
                info!("成功提取 {} 个单字 (模型: {})", words.len(), self.backend.model_name());
                words
            }
            Err(e) => {
                error!("使用 {} 提取单字时发生错误: {}", self.backend.model_name(), e);
                Vec::new()
            }
        }
    }

    /// 根据单字生成练习题，失败时返回空列表
    pub async fn generate_quiz(&self, words: &[VocabEntry]) -> Vec<QuizItem> {
        if words.is_empty() {
            error!("没有单字可以生成考题");
            return Vec::new();
        }

        let prompt = build_quiz_prompt(words);
        let result = match self.backend.complete(&prompt, Some(SYSTEM_PROMPT)).await {
            Ok(response) => parse_quiz(&response),
            Err(e) => Err(e),
        };

        match result {
            Ok(questions) => {
                info!("成功生成 {} 题考题", questions.len());
                questions
            }
            Err(e) => {
                error!("使用 {} 生成考题时发生错误: {}", self.backend.model_name(), e);
                Vec::new()
            }
        }
    }
}
