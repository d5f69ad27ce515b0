//! # TOEIC Toolkit
//!
//! 两条互不相关的自动化流程：
//! - 考题抓取：浏览器逐题打开页面，抽取题目 / 选项 / 答案，输出 JSON / Excel / Word
//! - TOEIC 单字：YouTube 字幕 → LLM 提取单字（可附练习题）→ 邮件或聊天机器人回复
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有页面资源，只暴露能力
//! - `JsExecutor` - 唯一的 page owner；`HtmlSnapshot` - 静态 HTML
//! - 两者都实现 `PageSource`，抽取逻辑不关心页面来源
//!
//! ### ② 业务能力层（Services）
//! - `QuestionExtractor` / `stat_parser` - 题目抽取能力
//! - `YouTubeService` / `TranscriptService` - 影片信息与字幕
//! - `LlmBackend`（Gemini / Ollama）+ `VocabService` - 单字与练习题
//!
//! ### ③ 流程层（Workflow）
//! - `BrowserFetcher` - "抓一道题"的完整步骤
//! - `retry_fixed` - 固定次数、固定间隔的重试
//! - `VocabFlow` - "一部影片"的单字流程
//!
//! ### ④ 编排层（Orchestration）
//! - `scrape_runner` - 区间遍历，失败跳过
//! - `webhook` - 聊天机器人回调服务
//!
//! 投递（`delivery/`）与文件输出（`output/`）由流程层和编排层调用。

pub mod app;
pub mod browser;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{HtmlSnapshot, JsExecutor, PageSource};
pub use models::{QuestionRecord, QuizItem, VideoDescriptor, VocabEntry};
pub use orchestrator::{run_scrape, ScrapeRunner};
pub use workflow::{BrowserFetcher, QuestionFetcher, VocabFlow};
