use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::QuestionRecord;

/// 写出缩进格式的 JSON（非 ASCII 字符原样保留）
pub fn write_json(records: &[QuestionRecord], path: &Path) -> AppResult<()> {
    let file = File::create(path)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    Ok(())
}
