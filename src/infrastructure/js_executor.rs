//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"导航 / 执行 JS / 读取文字"的能力

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::infrastructure::PageSource;

/// 隐藏自动化特征的脚本，每次导航后注入
const STEALTH_SCRIPT: &str = r#"
(() => {
    try {
        Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    } catch (e) {}
    console.clear = function() {};
    console.debug = function() {};
    const originalEval = window.eval;
    window.eval = function(str) {
        if (typeof str === 'string' && str.includes('debugger')) {
            return;
        }
        return originalEval.call(this, str);
    };
    document.addEventListener('contextmenu', e => e.stopPropagation(), true);
    document.addEventListener('keydown', e => {
        if (e.keyCode === 123) {
            e.stopPropagation();
        }
    }, true);
    return true;
})()
"#;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识 QuestionRecord
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 导航到指定 URL 并等待页面加载
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        Ok(())
    }

    /// 执行只关心副作用的 JS（返回值被丢弃）
    pub async fn run(&self, js_code: impl Into<String>) -> Result<()> {
        self.page.evaluate(js_code.into()).await?;
        Ok(())
    }

    /// 执行 JS 代码并返回 JSON 结果
    ///
    /// # 参数
    /// - `js_code`: 要执行的 JavaScript 代码
    ///
    /// # 返回
    /// 返回 JSON 值
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 注入反检测脚本
    pub async fn inject_stealth(&self) -> Result<()> {
        self.run(STEALTH_SCRIPT).await
    }

    /// 滚动到页面底部，触发懒加载内容
    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.run("window.scrollTo(0, document.body ? document.body.scrollHeight : 0)")
            .await
    }

    /// 滚动回页面顶部
    pub async fn scroll_to_top(&self) -> Result<()> {
        self.run("window.scrollTo(0, 0)").await
    }
}

#[async_trait]
impl PageSource for JsExecutor {
    async fn texts(&self, selector: &str) -> Result<Vec<String>> {
        // 选择器经 JSON 编码后嵌入脚本，避免引号问题
        let quoted = serde_json::to_string(selector)?;
        let js_code = format!(
            r#"Array.from(document.querySelectorAll({})).map(e => (e.innerText || '').trim())"#,
            quoted
        );
        self.eval_as(js_code).await
    }

    async fn body_text(&self) -> Result<String> {
        self.eval_as("document.body ? document.body.innerText : ''")
            .await
    }
}
