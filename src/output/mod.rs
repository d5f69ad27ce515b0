//! 抓取结果输出
//!
//! 文件名带时间戳：`questions_<YYYYmmdd_HHMMSS>.<ext>`

pub mod docx;
pub mod json;
pub mod xlsx;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::config::OutputFormat;
use crate::error::AppResult;
use crate::models::QuestionRecord;

/// 输出文件名前缀
pub const FILE_STEM: &str = "questions";

/// 生成带时间戳的输出路径
pub fn timestamped_path(dir: &Path, format: OutputFormat, now: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "{}_{}.{}",
        FILE_STEM,
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// 按单一格式写出
pub fn write_records(records: &[QuestionRecord], format: OutputFormat, path: &Path) -> AppResult<()> {
    match format {
        OutputFormat::Json => json::write_json(records, path),
        OutputFormat::Xlsx => xlsx::write_xlsx(records, path),
        OutputFormat::Docx => docx::write_docx(records, path),
    }
}

/// 按所有请求的格式写出，单个格式失败只记录日志
///
/// 返回成功写出的文件路径
pub fn write_all(records: &[QuestionRecord], dir: &Path, formats: &[OutputFormat]) -> Vec<PathBuf> {
    if records.is_empty() {
        warn!("没有数据可保存");
        return Vec::new();
    }

    if let Err(e) = std::fs::create_dir_all(dir) {
        error!("创建输出目录 {} 失败: {}", dir.display(), e);
        return Vec::new();
    }

    let now = Local::now();
    let mut written = Vec::new();
    for format in formats {
        let path = timestamped_path(dir, *format, now);
        match write_records(records, *format, &path) {
            Ok(()) => {
                info!("数据已保存至 {}", path.display());
                written.push(path);
            }
            Err(e) => error!("保存 {} 失败: {}", path.display(), e),
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Vec<QuestionRecord> {
        vec![QuestionRecord {
            question_number: 1,
            question_id: "3399058".into(),
            question_text: "下列何者正確？".into(),
            options: vec!["(A) 甲".into(), "(B) 乙".into()],
            correct_answer: "A".into(),
            explanation: "".into(),
            url: "https://x?info=item.3399058".into(),
        }]
    }

    #[test]
    fn path_contains_timestamp_and_extension() {
        let now = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let path = timestamped_path(Path::new("out"), OutputFormat::Xlsx, now);
        assert_eq!(path, Path::new("out").join("questions_20250102_030405.xlsx"));
    }

    #[test]
    fn writes_every_requested_format() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_all(
            &sample(),
            dir.path(),
            &[OutputFormat::Json, OutputFormat::Xlsx, OutputFormat::Docx],
        );
        assert_eq!(written.len(), 3);
        for path in written {
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }

    #[test]
    fn nothing_is_written_for_empty_results() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_all(&[], dir.path(), &[OutputFormat::Json]).is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
