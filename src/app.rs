use anyhow::{anyhow, Result};
use chrono::Local;
use tracing::{error, info, warn};

use crate::cli::Commands;
use crate::config::Config;
use crate::delivery::EmailSender;
use crate::orchestrator::{run_scrape, serve};
use crate::workflow::{EmailDigest, VocabFlow};

/// 应用主结构
pub struct App {
    config: Config,
    command: Commands,
}

impl App {
    /// 合并命令行参数并检查必需变量
    pub fn initialize(mut config: Config, command: Commands) -> Result<Self> {
        command.apply_to(&mut config).map_err(|e| anyhow!(e))?;
        config.ensure_ready(command.task())?;
        Ok(Self { config, command })
    }

    /// 运行子命令
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Scrape { .. } => {
                let report = run_scrape(&self.config).await?;
                info!("✅ 抓取完成，共 {} 题", report.records.len());
            }
            Commands::Vocab { url, quiz, email } => self.run_vocab(url, *quiz, *email).await?,
            Commands::Daily => self.run_daily().await?,
            Commands::Serve { .. } => serve(&self.config).await?,
        }
        Ok(())
    }

    async fn run_vocab(&self, url: &str, quiz: bool, email: bool) -> Result<()> {
        let flow = VocabFlow::new(&self.config);

        if !quiz && !email {
            let outcome = flow.chat_reply_for_url(url).await;
            println!("{}", outcome.message);
            return if outcome.success {
                Ok(())
            } else {
                Err(anyhow!("处理影片失败"))
            };
        }

        let today = today();
        let digest = if quiz {
            flow.digest_with_quiz(url).await
        } else {
            flow.digest_for_url(url, &today).await
        };
        let Some(digest) = digest else {
            return Err(anyhow!("无法生成单字内容: {}", url));
        };

        if email {
            self.send_digest(&digest).await
        } else {
            println!("{}", digest.html);
            Ok(())
        }
    }

    async fn run_daily(&self) -> Result<()> {
        let flow = VocabFlow::new(&self.config);
        match flow.daily_digest(&today()).await {
            Some(digest) => self.send_digest(&digest).await,
            None => {
                warn!("今日没有可发送的单字内容");
                Ok(())
            }
        }
    }

    async fn send_digest(&self, digest: &EmailDigest) -> Result<()> {
        let sender = EmailSender::new(&self.config);
        if sender
            .send(&digest.subject, &digest.html, &self.config.recipient_email)
            .await
        {
            Ok(())
        } else {
            error!("邮件未送达: {}", digest.subject);
            Err(anyhow!("邮件发送失败"))
        }
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
