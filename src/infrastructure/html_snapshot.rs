//! 静态 HTML 快照 - 基础设施层
//!
//! 用 `scraper` 解析已保存的页面，实现与浏览器相同的查询能力

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::infrastructure::PageSource;

/// 已下载的页面 HTML
///
/// 只保存原始字符串，每次查询时再解析（`Html` 不是 `Send`）
#[derive(Debug, Clone)]
pub struct HtmlSnapshot {
    html: String,
}

impl HtmlSnapshot {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    fn select_texts(&self, selector: &str) -> Result<Vec<String>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| anyhow!("无效的选择器 {}: {}", selector, e))?;
        let document = Html::parse_document(&self.html);
        Ok(document.select(&parsed).map(element_text).collect())
    }
}

/// 元素的文字内容，连续空白压缩为一个空格
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl PageSource for HtmlSnapshot {
    async fn texts(&self, selector: &str) -> Result<Vec<String>> {
        self.select_texts(selector)
    }

    async fn body_text(&self) -> Result<String> {
        Ok(self.select_texts("body")?.into_iter().next().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn texts_are_whitespace_normalised() {
        let snapshot = HtmlSnapshot::new(
            "<html><body><ul><li>  A.\n  apple </li><li>B. banana</li></ul></body></html>",
        );
        let texts = snapshot.texts("li").await.unwrap();
        assert_eq!(texts, vec!["A. apple", "B. banana"]);
    }

    #[tokio::test]
    async fn invalid_selector_is_an_error() {
        let snapshot = HtmlSnapshot::new("<p>x</p>");
        assert!(snapshot.texts("[[nope").await.is_err());
    }

    #[tokio::test]
    async fn body_text_of_empty_document_is_empty() {
        let snapshot = HtmlSnapshot::new("");
        assert_eq!(snapshot.body_text().await.unwrap(), "");
    }
}
