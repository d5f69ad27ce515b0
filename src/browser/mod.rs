pub mod connection;
pub mod headless;

pub use connection::connect_to_browser;
pub use headless::{launch_browser, LaunchOptions};

use std::time::Duration;

use anyhow::Result;
use chromiumoxide::{Browser, Handler};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::infrastructure::JsExecutor;

/// 在后台处理浏览器事件，直到连接断开
pub(crate) async fn spawn_event_loop(mut handler: Handler) -> JoinHandle<()> {
    let handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                debug!("浏览器事件流结束");
                break;
            }
        }
    });
    // 等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;
    handle
}

/// 一次运行期间持有的浏览器资源
///
/// 启动或连接后创建，运行结束时调用 [`BrowserSession::close`] 释放
pub struct BrowserSession {
    browser: Browser,
    executor: JsExecutor,
    handler: JoinHandle<()>,
    /// 自行启动的浏览器需要关闭；连接的外部浏览器保持运行
    owned: bool,
}

impl BrowserSession {
    /// 按配置启动新浏览器，或连接到调试端口上已有的浏览器
    pub async fn open(config: &Config) -> Result<Self> {
        match config.browser_debug_port {
            Some(port) => {
                let (browser, page, handler) = connect_to_browser(port, Some(&config.base_url)).await?;
                Ok(Self {
                    browser,
                    executor: JsExecutor::new(page),
                    handler,
                    owned: false,
                })
            }
            None => {
                let options = LaunchOptions::from_config(config);
                let (browser, page, handler) = launch_browser(&options).await?;
                Ok(Self {
                    browser,
                    executor: JsExecutor::new(page),
                    handler,
                    owned: true,
                })
            }
        }
    }

    pub fn executor(&self) -> &JsExecutor {
        &self.executor
    }

    /// 关闭浏览器（外部浏览器只断开事件处理）
    pub async fn close(mut self) {
        if self.owned {
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
            info!("浏览器已关闭");
        }
        self.handler.abort();
    }
}
