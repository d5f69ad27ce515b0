use std::fs::File;
use std::path::Path;

use docx_rs::{Docx, Paragraph, Run};

use crate::error::{AppError, AppResult};
use crate::models::QuestionRecord;

fn text_paragraph(text: impl Into<String>) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text.into()))
}

/// 写出 Word 文档，每道题依次列出题目、选项、答案和原始网址
pub fn write_docx(records: &[QuestionRecord], path: &Path) -> AppResult<()> {
    let mut doc = Docx::new();

    for record in records {
        doc = doc.add_paragraph(
            Paragraph::new().add_run(
                Run::new()
                    .add_text(format!("第 {} 题 (ID: {})", record.question_number, record.question_id))
                    .bold(),
            ),
        );
        doc = doc.add_paragraph(text_paragraph(format!("题目: {}", record.question_text)));
        for option in &record.options {
            doc = doc.add_paragraph(text_paragraph(option.as_str()));
        }
        doc = doc.add_paragraph(text_paragraph(format!("答案: {}", record.correct_answer)));
        if !record.explanation.is_empty() {
            doc = doc.add_paragraph(text_paragraph(format!("解析: {}", record.explanation)));
        }
        doc = doc.add_paragraph(text_paragraph(format!("原始网址: {}", record.url)));
        doc = doc.add_paragraph(Paragraph::new());
    }

    let file = File::create(path)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    doc.build()
        .pack(file)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    Ok(())
}
