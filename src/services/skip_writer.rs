//! 跳过记录服务 - 业务能力层
//!
//! 只负责"把重试耗尽的题目写进 skipped.txt"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// 跳过记录写入服务
///
/// 每行一条：时间、题目 ID、URL、最后一次失败原因
pub struct SkipWriter {
    path: PathBuf,
}

impl SkipWriter {
    /// 使用默认文件名 `skipped.txt`
    pub fn new() -> Self {
        Self::with_path("skipped.txt")
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 追加一条跳过记录
    pub fn write(&self, question_id: u64, url: &str, reason: &str) -> Result<()> {
        debug!("写入跳过记录: 题目 {} | 原因: {}", question_id, reason);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let line = format!(
            "{} | 题目 {} | {} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            question_id,
            url,
            reason.replace('\n', " ")
        );
        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

impl Default for SkipWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_line_per_skip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skipped.txt");
        let writer = SkipWriter::with_path(&path);

        writer.write(3399058, "https://x?info=item.3399058", "timeout\nagain").unwrap();
        writer.write(3399059, "https://x?info=item.3399059", "blocked").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("题目 3399058"));
        assert!(lines[0].ends_with("timeout again"));
        assert!(lines[1].contains("blocked"));
    }
}
