//! 页面内容来源 - 基础设施层
//!
//! 抽取逻辑只依赖这个 trait，不关心背后是真实浏览器还是静态 HTML

use anyhow::Result;
use async_trait::async_trait;

/// 可被查询文字内容的页面
#[async_trait]
pub trait PageSource: Send + Sync {
    /// 按 CSS 选择器返回所有匹配元素的可见文字（按文档顺序，已去除首尾空白）
    ///
    /// 选择器无效或查询失败时返回错误，由调用方决定是否尝试下一个选择器
    async fn texts(&self, selector: &str) -> Result<Vec<String>>;

    /// 整个 body 的可见文字
    async fn body_text(&self) -> Result<String>;
}
