use anyhow::Result;
use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::browser::spawn_event_loop;
use crate::error::BrowserError;

/// 连接到已开启调试端口的浏览器
///
/// 若已有标签页停在 `reuse_prefix` 开头的地址上则直接复用，否则新开空白页
pub async fn connect_to_browser(
    port: u16,
    reuse_prefix: Option<&str>,
) -> Result<(Browser, Page, JoinHandle<()>)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        BrowserError::ConnectionFailed { port, source: e }
    })?;
    let handle = spawn_event_loop(handler).await;

    if let Some(prefix) = reuse_prefix {
        let pages = browser.pages().await?;
        debug!("已打开 {} 个标签页", pages.len());
        for page in pages {
            if let Ok(Some(url)) = page.url().await {
                if url.starts_with(prefix) {
                    info!("✓ 复用已打开的页面: {}", url);
                    return Ok((browser, page, handle));
                }
            }
        }
    }

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        e
    })?;
    Ok((browser, page, handle))
}
