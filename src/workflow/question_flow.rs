//! 单题抓取流程 - 流程层
//!
//! 核心职责：定义"抓一道题"的完整步骤
//!
//! 流程顺序：
//! 1. 导航到题目页面，等待加载
//! 2. 注入反检测脚本，上下滚动触发懒加载
//! 3. 按抽取方式（选择器 / 纯文字）生成题目记录

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use crate::config::{Config, ExtractMode};
use crate::infrastructure::{JsExecutor, PageSource};
use crate::models::QuestionRecord;
use crate::services::{stat_parser, QuestionExtractor};

/// 抓取单道题目的能力
///
/// 返回错误表示本次尝试失败，由调用方决定是否重试
#[async_trait]
pub trait QuestionFetcher: Send + Sync {
    async fn fetch(&self, url: &str, question_number: usize) -> Result<QuestionRecord>;
}

/// 基于真实浏览器页面的抓取流程
///
/// - 不持有 page，只借用 JsExecutor
/// - 不重试，重试由编排层负责
pub struct BrowserFetcher<'a> {
    executor: &'a JsExecutor,
    extractor: QuestionExtractor,
    mode: ExtractMode,
    settle: Duration,
    scroll_pause: Duration,
}

impl<'a> BrowserFetcher<'a> {
    pub fn new(executor: &'a JsExecutor, config: &Config) -> Self {
        Self {
            executor,
            extractor: QuestionExtractor::new(),
            mode: config.extract_mode,
            settle: Duration::from_millis(config.page_settle_ms),
            scroll_pause: Duration::from_millis(500),
        }
    }

    /// 上下滚动一次，确保动态内容已加载
    async fn warm_up_page(&self) -> Result<()> {
        self.executor.inject_stealth().await?;
        self.executor.scroll_to_bottom().await?;
        sleep(self.scroll_pause).await;
        self.executor.scroll_to_top().await?;
        sleep(self.scroll_pause).await;
        Ok(())
    }
}

#[async_trait]
impl QuestionFetcher for BrowserFetcher<'_> {
    async fn fetch(&self, url: &str, question_number: usize) -> Result<QuestionRecord> {
        self.executor.goto(url).await?;
        sleep(self.settle).await;
        self.warm_up_page().await?;

        let record = match self.mode {
            ExtractMode::Selector => {
                self.extractor
                    .extract(self.executor, url, question_number)
                    .await
            }
            ExtractMode::Text => {
                let text = self.executor.body_text().await?;
                stat_parser::record_from_text(&text, url, question_number)
            }
        };

        debug!(
            "题目 {} 抽取完成: 文字 {} 字, 选项 {} 个",
            question_number,
            record.question_text.chars().count(),
            record.options.len()
        );
        Ok(record)
    }
}
