//! 区间抓取编排 - 编排层
//!
//! ## 职责
//!
//! 1. **资源管理**：启动 / 连接浏览器，运行结束后关闭
//! 2. **区间遍历**：按 `start_id..start_id+total` 逐题抓取
//! 3. **重试兜底**：每题最多尝试固定次数，失败后写入跳过记录并继续下一题
//! 4. **结果输出**：汇总统计，按配置写出 JSON / Excel / Word

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::models::ScrapeReport;
use crate::output;
use crate::services::SkipWriter;
use crate::utils::logging::{log_scrape_startup, print_scrape_stats};
use crate::workflow::{retry_fixed, BrowserFetcher, QuestionFetcher, RetryPolicy};

/// 题目页面地址
pub fn question_url(base_url: &str, id: u64) -> String {
    format!("{}?info=item.{}", base_url, id)
}

/// 区间抓取器
///
/// 不持有浏览器，只负责遍历、重试和跳过
pub struct ScrapeRunner {
    policy: RetryPolicy,
    item_delay: Duration,
    skip_writer: Option<SkipWriter>,
}

impl ScrapeRunner {
    pub fn new(policy: RetryPolicy, item_delay: Duration) -> Self {
        Self {
            policy,
            item_delay,
            skip_writer: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RetryPolicy::from_config(config),
            Duration::from_millis(config.item_delay_ms),
        )
        .with_skip_writer(SkipWriter::with_path(config.output_dir.join(&config.skip_log_file)))
    }

    pub fn with_skip_writer(mut self, writer: SkipWriter) -> Self {
        self.skip_writer = Some(writer);
        self
    }

    /// 依次抓取 `total` 道题
    ///
    /// 单题失败不会中断循环：重试耗尽后记录并跳过
    pub async fn run(
        &self,
        fetcher: &dyn QuestionFetcher,
        base_url: &str,
        start_id: u64,
        total: usize,
    ) -> ScrapeReport {
        let mut report = ScrapeReport::default();

        for i in 0..total {
            let current_id = start_id + i as u64;
            let question_number = i + 1;
            let url = question_url(base_url, current_id);

            info!(
                "\n正在抓取第 {}/{} 题 (ID: {})",
                question_number, total, current_id
            );
            info!("URL: {}", url);

            let label = format!("第 {} 题", question_number);
            let result = retry_fixed(self.policy, &label, |_| {
                fetcher.fetch(&url, question_number)
            })
            .await;

            match result {
                Ok(record) => {
                    info!("✓ 第 {} 题抓取成功", question_number);
                    report.records.push(record);
                }
                Err(e) => {
                    warn!("多次失败，跳过第 {} 题 (ID: {})", question_number, current_id);
                    report.skipped_ids.push(current_id);
                    if let Some(writer) = &self.skip_writer {
                        if let Err(write_err) = writer.write(current_id, &url, &e.to_string()) {
                            error!("写入跳过记录失败: {}", write_err);
                        }
                    }
                }
            }

            // 避免请求过于频繁
            if question_number < total && !self.item_delay.is_zero() {
                sleep(self.item_delay).await;
            }
        }

        report
    }
}

/// 完整的抓取命令：打开浏览器 → 区间抓取 → 关闭浏览器 → 写出文件
pub async fn run_scrape(config: &Config) -> Result<ScrapeReport> {
    let total = config.total_questions;
    let last_id = config.start_id + total.saturating_sub(1) as u64;
    log_scrape_startup(
        config.start_id,
        total,
        &question_url(&config.base_url, config.start_id),
        &question_url(&config.base_url, last_id),
    );

    let session = BrowserSession::open(config).await?;
    let fetcher = BrowserFetcher::new(session.executor(), config);
    let runner = ScrapeRunner::from_config(config);

    let report = runner
        .run(&fetcher, &config.base_url, config.start_id, total)
        .await;

    drop(fetcher);
    session.close().await;

    if report.records.is_empty() {
        warn!("未能抓取到任何题目数据");
        return Ok(report);
    }

    print_scrape_stats(&report, total);
    output::write_all(&report.records, &config.output_dir, &config.output_formats);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionRecord;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 指定 ID 永远失败，其他 ID 在第 `succeed_on` 次尝试时成功
    struct FlakyFetcher {
        always_fail: u64,
        succeed_on: usize,
        attempts: Mutex<HashMap<String, usize>>,
    }

    impl FlakyFetcher {
        fn attempts_for(&self, url: &str) -> usize {
            self.attempts.lock().unwrap().get(url).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl QuestionFetcher for FlakyFetcher {
        async fn fetch(&self, url: &str, question_number: usize) -> Result<QuestionRecord> {
            let attempt = {
                let mut map = self.attempts.lock().unwrap();
                let count = map.entry(url.to_string()).or_insert(0);
                *count += 1;
                *count
            };
            if url.ends_with(&self.always_fail.to_string()) {
                return Err(anyhow!("page crashed"));
            }
            if attempt < self.succeed_on {
                return Err(anyhow!("timeout"));
            }
            Ok(QuestionRecord::new(url, question_number))
        }
    }

    #[tokio::test]
    async fn exhausted_item_is_skipped_and_loop_continues() {
        let dir = tempfile::tempdir().unwrap();
        let skip_path = dir.path().join("skipped.txt");
        let fetcher = FlakyFetcher {
            always_fail: 101,
            succeed_on: 2,
            attempts: Mutex::new(HashMap::new()),
        };
        let runner = ScrapeRunner::new(RetryPolicy::immediate(3), Duration::ZERO)
            .with_skip_writer(SkipWriter::with_path(&skip_path));

        let report = runner.run(&fetcher, "https://x/exam", 100, 3).await;

        assert_eq!(report.skipped_ids, vec![101]);
        let ids: Vec<&str> = report.records.iter().map(|r| r.question_id.as_str()).collect();
        assert_eq!(ids, vec!["100", "102"]);
        assert_eq!(report.records[1].question_number, 3);
        assert_eq!(fetcher.attempts_for("https://x/exam?info=item.101"), 3);
        assert_eq!(fetcher.attempts_for("https://x/exam?info=item.102"), 2);

        let skipped = std::fs::read_to_string(&skip_path).unwrap();
        assert!(skipped.contains("题目 101"));
        assert!(skipped.contains("page crashed"));
    }

    #[test]
    fn url_uses_item_query() {
        assert_eq!(
            question_url("https://app.yamol.tw/exam/125609", 3399058),
            "https://app.yamol.tw/exam/125609?info=item.3399058"
        );
    }
}
