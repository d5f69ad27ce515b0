use serde::{Deserialize, Serialize};

/// 页面上找不到任何题目文字时使用的占位内容
pub const NO_QUESTION_TEXT: &str = "无法获取题目内容";

/// 一道抓取下来的题目
///
/// 所有字段都是"尽力而为"，取不到的内容保持为空字符串 / 空列表。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 本次运行中的题号（从 1 开始）
    pub question_number: usize,
    /// URL 中 `item.` 之后的部分
    pub question_id: String,
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub url: String,
}

impl QuestionRecord {
    /// 创建只包含题号、ID 和 URL 的空记录
    pub fn new(url: impl Into<String>, question_number: usize) -> Self {
        let url = url.into();
        let question_id = question_id_from_url(&url);
        Self {
            question_number,
            question_id,
            url,
            ..Default::default()
        }
    }

    /// 是否取到了真实的题目文字
    pub fn has_text(&self) -> bool {
        !self.question_text.is_empty() && self.question_text != NO_QUESTION_TEXT
    }
}

/// 从 `...?info=item.3399058` 形式的地址中取出题目 ID
pub fn question_id_from_url(url: &str) -> String {
    url.split_once("item.")
        .map(|(_, id)| id.to_string())
        .unwrap_or_default()
}

/// 一次区间抓取的结果
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    pub records: Vec<QuestionRecord>,
    /// 重试耗尽后被跳过的题目 ID
    pub skipped_ids: Vec<u64>,
}

impl ScrapeReport {
    pub fn with_text(&self) -> usize {
        self.records.iter().filter(|r| r.has_text()).count()
    }

    pub fn with_options(&self) -> usize {
        self.records.iter().filter(|r| !r.options.is_empty()).count()
    }

    pub fn with_answer(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.correct_answer.is_empty())
            .count()
    }
}
