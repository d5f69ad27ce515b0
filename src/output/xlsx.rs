use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::error::{AppError, AppResult};
use crate::models::QuestionRecord;

const HEADERS: [&str; 7] = [
    "question_number",
    "question_id",
    "question_text",
    "options",
    "correct_answer",
    "explanation",
    "url",
];

/// 写出 Excel 表格，每道题一行，选项以换行分隔
pub fn write_xlsx(records: &[QuestionRecord], path: &Path) -> AppResult<()> {
    build_workbook(records, path)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))
}

fn build_workbook(records: &[QuestionRecord], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    for (col, title) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_number(row, 0, record.question_number as f64)?;
        worksheet.write_string(row, 1, &record.question_id)?;
        worksheet.write_string(row, 2, &record.question_text)?;
        worksheet.write_string(row, 3, record.options.join("\n"))?;
        worksheet.write_string(row, 4, &record.correct_answer)?;
        worksheet.write_string(row, 5, &record.explanation)?;
        worksheet.write_string(row, 6, &record.url)?;
    }

    worksheet.set_column_width(2, 60)?;
    worksheet.set_column_width(3, 40)?;
    workbook.save(path)?;
    Ok(())
}
