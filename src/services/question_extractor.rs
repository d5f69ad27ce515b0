//! 题目抽取服务 - 业务能力层
//!
//! 只负责"从一个页面里找出题目"的能力：按优先级依次尝试一组 CSS 选择器，
//! 第一个通过长度检查的结果胜出；全部失败时退回到截取整页文字。

use tracing::debug;

use crate::infrastructure::PageSource;
use crate::models::{QuestionRecord, NO_QUESTION_TEXT};

pub const QUESTION_SELECTORS: &[&str] = &[
    ".question-content",
    ".question-text",
    "[class*=\"question\"]",
    ".content",
    ".item-content",
    "h3",
    "h4",
    ".card-body",
];

pub const OPTION_SELECTORS: &[&str] = &[
    ".option",
    ".choice",
    "[class*=\"option\"]",
    "[class*=\"choice\"]",
    "li",
    ".answer-choice",
];

pub const ANSWER_SELECTORS: &[&str] = &[
    ".correct-answer",
    ".answer",
    "[class*=\"correct\"]",
    "[class*=\"answer\"]",
    ".solution",
];

pub const EXPLANATION_SELECTORS: &[&str] = &[
    ".explanation",
    ".解析",
    "[class*=\"explanation\"]",
    "[class*=\"解析\"]",
    ".detail",
];

/// 题目文字的最小长度（字符数，不含）
const MIN_QUESTION_CHARS: usize = 10;
/// 单个选项的最大长度（字符数，不含）
const MAX_OPTION_CHARS: usize = 200;
/// 至少要找到的选项数量
const MIN_OPTIONS: usize = 2;
/// 兜底时截取的 body 文字长度
const BODY_FALLBACK_CHARS: usize = 500;

/// 题目抽取器
///
/// 职责：
/// - 依次尝试选择器，接受第一个合格结果
/// - 选择器报错视为"没找到"，继续下一个
/// - 不导航、不重试
#[derive(Debug, Clone)]
pub struct QuestionExtractor {
    question_selectors: Vec<String>,
    option_selectors: Vec<String>,
    answer_selectors: Vec<String>,
    explanation_selectors: Vec<String>,
}

impl Default for QuestionExtractor {
    fn default() -> Self {
        Self {
            question_selectors: to_owned(QUESTION_SELECTORS),
            option_selectors: to_owned(OPTION_SELECTORS),
            answer_selectors: to_owned(ANSWER_SELECTORS),
            explanation_selectors: to_owned(EXPLANATION_SELECTORS),
        }
    }
}

fn to_owned(selectors: &[&str]) -> Vec<String> {
    selectors.iter().map(|s| s.to_string()).collect()
}

impl QuestionExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换题目文字的选择器列表
    pub fn with_question_selectors(mut self, selectors: &[&str]) -> Self {
        self.question_selectors = to_owned(selectors);
        self
    }

    /// 替换选项的选择器列表
    pub fn with_option_selectors(mut self, selectors: &[&str]) -> Self {
        self.option_selectors = to_owned(selectors);
        self
    }

    /// 从页面抽取一条题目记录
    pub async fn extract(
        &self,
        source: &dyn PageSource,
        url: &str,
        question_number: usize,
    ) -> QuestionRecord {
        let mut record = QuestionRecord::new(url, question_number);

        record.question_text = match self.find_question_text(source).await {
            Some(text) => text,
            None => body_fallback(source).await,
        };
        record.options = self.find_options(source).await;
        record.correct_answer = first_non_empty(source, &self.answer_selectors, "答案").await;
        record.explanation =
            first_non_empty(source, &self.explanation_selectors, "解析").await;

        record
    }

    /// 每个选择器内取第一个超过最小长度的元素
    pub async fn find_question_text(&self, source: &dyn PageSource) -> Option<String> {
        for selector in &self.question_selectors {
            let texts = match source.texts(selector).await {
                Ok(texts) => texts,
                Err(e) => {
                    debug!("题目选择器 {} 查询失败: {}", selector, e);
                    continue;
                }
            };
            if let Some(text) = texts
                .into_iter()
                .map(|t| t.trim().to_string())
                .find(|t| t.chars().count() > MIN_QUESTION_CHARS)
            {
                debug!("题目选择器命中: {}", selector);
                return Some(text);
            }
        }
        None
    }

    /// 每个选择器内收集所有合格选项，至少两个才接受
    pub async fn find_options(&self, source: &dyn PageSource) -> Vec<String> {
        for selector in &self.option_selectors {
            let texts = match source.texts(selector).await {
                Ok(texts) => texts,
                Err(e) => {
                    debug!("选项选择器 {} 查询失败: {}", selector, e);
                    continue;
                }
            };
            let options: Vec<String> = texts
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty() && t.chars().count() < MAX_OPTION_CHARS)
                .collect();
            if options.len() >= MIN_OPTIONS {
                debug!("选项选择器命中: {} ({} 项)", selector, options.len());
                return options;
            }
        }
        Vec::new()
    }
}

/// 取每个选择器的第一个匹配元素，文字非空即接受
async fn first_non_empty(source: &dyn PageSource, selectors: &[String], label: &str) -> String {
    for selector in selectors {
        match source.texts(selector).await {
            Ok(texts) => {
                if let Some(first) = texts.into_iter().next() {
                    let text = first.trim();
                    if !text.is_empty() {
                        debug!("{}选择器命中: {}", label, selector);
                        return text.to_string();
                    }
                }
            }
            Err(e) => debug!("{}选择器 {} 查询失败: {}", label, selector, e),
        }
    }
    String::new()
}

/// 找不到题目元素时，截取整个 body 的前 500 个字符
async fn body_fallback(source: &dyn PageSource) -> String {
    match source.body_text().await {
        Ok(body) if !body.is_empty() => body.chars().take(BODY_FALLBACK_CHARS).collect(),
        Ok(_) => NO_QUESTION_TEXT.to_string(),
        Err(e) => {
            debug!("读取 body 文字失败: {}", e);
            NO_QUESTION_TEXT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::HtmlSnapshot;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// 按选择器返回预设结果的假页面
    struct FakePage {
        by_selector: HashMap<&'static str, Result<Vec<String>, &'static str>>,
        body: &'static str,
    }

    #[async_trait]
    impl PageSource for FakePage {
        async fn texts(&self, selector: &str) -> Result<Vec<String>> {
            match self.by_selector.get(selector) {
                Some(Ok(texts)) => Ok(texts.clone()),
                Some(Err(msg)) => Err(anyhow!(*msg)),
                None => Ok(Vec::new()),
            }
        }

        async fn body_text(&self) -> Result<String> {
            Ok(self.body.to_string())
        }
    }

    #[tokio::test]
    async fn later_selector_wins_when_earlier_ones_fail() {
        let page = FakePage {
            by_selector: HashMap::from([
                (".question-content", Ok(vec!["short".to_string()])),
                (".question-text", Err("boom")),
                (
                    "h3",
                    Ok(vec!["Which word best completes the sentence?".to_string()]),
                ),
                (".card-body", Ok(vec!["should never be reached".to_string()])),
            ]),
            body: "",
        };

        let text = QuestionExtractor::new().find_question_text(&page).await;
        assert_eq!(text.as_deref(), Some("Which word best completes the sentence?"));
    }

    #[tokio::test]
    async fn first_long_element_inside_selector_is_used() {
        let page = FakePage {
            by_selector: HashMap::from([(
                ".content",
                Ok(vec![
                    "tiny".to_string(),
                    "  The meeting has been postponed until Friday.  ".to_string(),
                    "Another long candidate text here".to_string(),
                ]),
            )]),
            body: "",
        };

        let text = QuestionExtractor::new().find_question_text(&page).await;
        assert_eq!(text.as_deref(), Some("The meeting has been postponed until Friday."));
    }

    #[tokio::test]
    async fn single_option_is_not_enough() {
        let page = FakePage {
            by_selector: HashMap::from([
                (".option", Ok(vec!["(A) only one".to_string()])),
                (
                    "li",
                    Ok(vec![
                        "(A) apple".to_string(),
                        "".to_string(),
                        "x".repeat(250),
                        "(B) banana".to_string(),
                    ]),
                ),
            ]),
            body: "",
        };

        let options = QuestionExtractor::new().find_options(&page).await;
        assert_eq!(options, vec!["(A) apple", "(B) banana"]);
    }

    #[tokio::test]
    async fn body_is_truncated_when_nothing_matches() {
        let page = FakePage {
            by_selector: HashMap::new(),
            body: Box::leak("字".repeat(800).into_boxed_str()),
        };

        let record = QuestionExtractor::new()
            .extract(&page, "https://x/exam?info=item.42", 3)
            .await;
        assert_eq!(record.question_text.chars().count(), 500);
        assert_eq!(record.question_id, "42");
        assert_eq!(record.question_number, 3);
        assert!(record.options.is_empty());
    }

    #[tokio::test]
    async fn empty_body_gives_placeholder() {
        let page = FakePage {
            by_selector: HashMap::new(),
            body: "",
        };
        let record = QuestionExtractor::new().extract(&page, "u", 1).await;
        assert_eq!(record.question_text, NO_QUESTION_TEXT);
    }

    #[tokio::test]
    async fn extracts_full_record_from_html() {
        let html = r#"
        <html><body>
          <div class="question-text">The report must be submitted ____ Friday.</div>
          <ul>
            <li class="choice">(A) by</li>
            <li class="choice">(B) until</li>
            <li class="choice">(C) since</li>
          </ul>
          <div class="answer"></div>
          <div class="solution">A</div>
          <div class="detail">"by" marks a deadline.</div>
        </body></html>"#;

        let record = QuestionExtractor::new()
            .extract(&HtmlSnapshot::new(html), "https://x/exam?info=item.7", 1)
            .await;

        assert_eq!(record.question_text, "The report must be submitted ____ Friday.");
        assert_eq!(record.options, vec!["(A) by", "(B) until", "(C) since"]);
        // `.answer` 为空，继续尝试直到 `.solution`
        assert_eq!(record.correct_answer, "A");
        assert_eq!(record.explanation, "\"by\" marks a deadline.");
    }
}
