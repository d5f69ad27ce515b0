use std::path::PathBuf;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::browser::spawn_event_loop;
use crate::config::Config;
use crate::error::BrowserError;

/// 模拟真实桌面浏览器的 User-Agent
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 代替 chromiumoxide 默认参数的基础参数，不含 `--enable-automation`
const BASE_ARGS: [&str; 16] = [
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-client-side-phishing-detection",
    "--disable-default-apps",
    "--disable-extensions",
    "--disable-features=TranslateUI",
    "--disable-hang-monitor",
    "--disable-popup-blocking",
    "--disable-prompt-on-repost",
    "--disable-renderer-backgrounding",
    "--disable-sync",
    "--no-first-run",
    "--password-store=basic",
    "--use-mock-keychain",
];

/// 浏览器启动参数
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub user_agent: String,
    pub window_size: (u32, u32),
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            user_agent: USER_AGENT.to_string(),
            window_size: (1920, 1080),
        }
    }
}

impl LaunchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            headless: config.headless,
            executable: config.chrome_executable.as_ref().map(PathBuf::from),
            ..Self::default()
        }
    }

    /// 传给浏览器进程的命令行参数
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = BASE_ARGS.iter().map(|arg| arg.to_string()).collect();
        args.extend([
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-web-security".to_string(),
            "--allow-running-insecure-content".to_string(),
            format!("--user-agent={}", self.user_agent),
        ]);
        args
    }
}

/// 启动浏览器并打开一个空白页面
pub async fn launch_browser(options: &LaunchOptions) -> Result<(Browser, Page, JoinHandle<()>)> {
    info!(
        "🚀 启动浏览器 ({})...",
        if options.headless { "无头模式" } else { "有界面模式" }
    );

    // 默认参数带 --enable-automation，会让 navigator.webdriver 为 true
    let mut builder = BrowserConfig::builder()
        .disable_default_args()
        .window_size(options.window_size.0, options.window_size.1)
        .args(options.args());
    builder = if options.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = &options.executable {
        builder = builder.chrome_executable(path);
    }

    let config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        BrowserError::LaunchFailed(e)
    })?;

    let (browser, handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed(e.to_string())
    })?;
    debug!("浏览器启动成功");

    let handle = spawn_event_loop(handler).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        e
    })?;

    Ok((browser, page, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_carry_user_agent_and_stealth_flags() {
        let args = LaunchOptions::default().args();
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
        assert!(!args.iter().any(|a| a.contains("enable-automation")));
        assert!(args.contains(&"--no-first-run".to_string()));
    }

    #[test]
    fn options_follow_config() {
        let config = Config {
            headless: false,
            chrome_executable: Some("/usr/bin/chromium".to_string()),
            ..Config::default()
        };
        let options = LaunchOptions::from_config(&config);
        assert!(!options.headless);
        assert_eq!(options.executable, Some(PathBuf::from("/usr/bin/chromium")));
    }
}
