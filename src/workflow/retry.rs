//! 固定次数、固定间隔的重试

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::time::sleep;
use tracing::warn;

use crate::config::Config;

/// 重试策略：最多尝试 `attempts` 次，每次失败后等待 `delay`（无退避）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            attempts: config.retry_attempts.max(1),
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// 不等待的策略（测试用）
    pub fn immediate(attempts: usize) -> Self {
        Self {
            attempts,
            delay: Duration::ZERO,
        }
    }
}

/// 按策略执行 `op`，返回第一次成功的结果或最后一次的错误
///
/// 最后一次失败后不再等待
pub async fn retry_fixed<T, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 1..=policy.attempts {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("✗ {} 第 {}/{} 次尝试失败: {}", label, attempt, policy.attempts, e);
                last_error = Some(e);
                if attempt < policy.attempts {
                    warn!("等待 {:?} 后重试...", policy.delay);
                    sleep(policy.delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("{} 未执行（尝试次数为 0）", label)))
}
