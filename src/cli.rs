//! 命令行参数

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, ExtractMode, OutputFormat, Task};

/// 考题抓取 + TOEIC 单字学习工具
#[derive(Debug, Parser)]
#[command(name = "toeic_toolkit")]
#[command(about = "Exam question scraper and TOEIC vocabulary pipeline", long_about = None)]
pub struct Cli {
    /// TOML 配置文件（默认读取当前目录的 toolkit.toml）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// 按题目 ID 区间抓取考题
    Scrape {
        /// 起始题目 ID
        #[arg(long)]
        start_id: Option<u64>,
        /// 抓取题数
        #[arg(long)]
        total: Option<usize>,
        /// 抽取方式：selector 或 text
        #[arg(long)]
        mode: Option<ExtractMode>,
        /// 输出格式，逗号分隔：json,xlsx,docx
        #[arg(long)]
        formats: Option<String>,
        /// 输出目录
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// 显示浏览器窗口
        #[arg(long)]
        headed: bool,
        /// 连接已启动浏览器的调试端口
        #[arg(long)]
        debug_port: Option<u16>,
    },
    /// 从指定影片提取单字
    Vocab {
        /// YouTube 影片链接
        #[arg(long)]
        url: String,
        /// 同时生成练习题
        #[arg(long)]
        quiz: bool,
        /// 以邮件发送结果（否则打印到终端）
        #[arg(long)]
        email: bool,
    },
    /// 搜索最新影片并发送每日单字邮件
    Daily,
    /// 启动聊天机器人 webhook 服务
    Serve {
        /// 监听端口
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Commands {
    /// 对应的必需变量检查项
    pub fn task(&self) -> Task {
        match self {
            Commands::Scrape { .. } => Task::Scrape,
            Commands::Vocab { email, .. } => Task::Vocab { email: *email },
            Commands::Daily => Task::Daily,
            Commands::Serve { .. } => Task::Serve,
        }
    }

    /// 命令行参数覆盖配置
    pub fn apply_to(&self, config: &mut Config) -> Result<(), String> {
        match self {
            Commands::Scrape {
                start_id,
                total,
                mode,
                formats,
                output_dir,
                headed,
                debug_port,
            } => {
                if let Some(start_id) = start_id {
                    config.start_id = *start_id;
                }
                if let Some(total) = total {
                    config.total_questions = *total;
                }
                if let Some(mode) = mode {
                    config.extract_mode = *mode;
                }
                if let Some(formats) = formats {
                    config.output_formats = OutputFormat::parse_list(formats)?;
                }
                if let Some(dir) = output_dir {
                    config.output_dir = dir.clone();
                }
                if *headed {
                    config.headless = false;
                }
                if debug_port.is_some() {
                    config.browser_debug_port = *debug_port;
                }
            }
            Commands::Serve { port: Some(port) } => config.webhook_port = *port,
            Commands::Vocab { .. } | Commands::Daily | Commands::Serve { port: None } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_flags_override_config() {
        let cli = Cli::try_parse_from([
            "toeic_toolkit",
            "scrape",
            "--start-id",
            "100",
            "--total",
            "5",
            "--mode",
            "text",
            "--formats",
            "json,docx",
            "--headed",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.command.apply_to(&mut config).unwrap();

        assert_eq!(config.start_id, 100);
        assert_eq!(config.total_questions, 5);
        assert_eq!(config.extract_mode, ExtractMode::Text);
        assert_eq!(config.output_formats, vec![OutputFormat::Json, OutputFormat::Docx]);
        assert!(!config.headless);
        assert_eq!(cli.command.task(), Task::Scrape);
    }

    #[test]
    fn vocab_requires_url() {
        assert!(Cli::try_parse_from(["toeic_toolkit", "vocab"]).is_err());

        let cli = Cli::try_parse_from([
            "toeic_toolkit",
            "--config",
            "my.toml",
            "vocab",
            "--url",
            "https://youtu.be/plbqT4dBNwo",
            "--email",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert_eq!(cli.command.task(), Task::Vocab { email: true });
    }

    #[test]
    fn bad_format_is_reported() {
        let cli = Cli::try_parse_from(["toeic_toolkit", "scrape", "--formats", "pdf"]).unwrap();
        assert!(cli.command.apply_to(&mut Config::default()).is_err());
    }
}
