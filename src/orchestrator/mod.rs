//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `scrape_runner` - 题目区间抓取
//! - 管理浏览器生命周期
//! - 遍历题目 ID，固定次数重试，失败跳过
//! - 输出统计和结果文件
//!
//! ### `webhook` - 聊天机器人 Webhook 服务
//! - 接收消息事件，立即返回 200
//! - 每条消息交给一个后台任务处理（不等待、不取消）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator (区间循环 / HTTP 服务)
//!     ↓
//! workflow (单题抓取 / 单个影片的单字流程)
//!     ↓
//! services (能力层：抽取 / YouTube / LLM / 投递)
//!     ↓
//! infrastructure (基础设施：JsExecutor / HtmlSnapshot)
//! ```

pub mod scrape_runner;
pub mod webhook;

pub use scrape_runner::{question_url, run_scrape, ScrapeRunner};
pub use webhook::{router, serve, WebhookState};
