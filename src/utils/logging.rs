/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::models::{QuestionRecord, ScrapeReport};

/// 记录爬虫启动信息
///
/// # 参数
/// - `start_id`: 起始题目ID
/// - `total`: 题目数量
/// - `first_url` / `last_url`: 第一题与最后一题的地址
pub fn log_scrape_startup(start_id: u64, total: usize, first_url: &str, last_url: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 准备抓取 {} 题，从ID {} 开始", total, start_id);
    info!("第1题: {}", first_url);
    info!("第{}题: {}", total, last_url);
    info!("{}", "=".repeat(60));
}

/// 打印抓取统计信息
///
/// # 参数
/// - `report`: 抓取结果
/// - `total`: 计划抓取的题目数量
pub fn print_scrape_stats(report: &ScrapeReport, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 抓取完成！成功获取 {}/{} 题", report.records.len(), total);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("成功获取题目内容: {} 题", report.with_text());
    info!("成功获取选项: {} 题", report.with_options());
    info!("成功获取答案: {} 题", report.with_answer());
    if !report.skipped_ids.is_empty() {
        info!("❌ 跳过: {:?}", report.skipped_ids);
    }

    if let Some(first) = report.records.first() {
        info!("\n第1题内容示例:");
        log_record_preview(first);
    }
    if report.records.len() > 1 {
        if let Some(last) = report.records.last() {
            info!("\n第{}题内容示例:", report.records.len());
            log_record_preview(last);
        }
    }
}

/// 以截断形式输出一条题目记录
pub fn log_record_preview(record: &QuestionRecord) {
    info!("{}", "-".repeat(40));
    info!("question_number: {}", record.question_number);
    info!("question_id: {}", record.question_id);
    info!("question_text: {}", truncate_text(&record.question_text, 100));
    if !record.options.is_empty() {
        let head = record
            .options
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let more = if record.options.len() > 3 { "..." } else { "" };
        info!("options: {}{}", head, more);
    }
    info!("correct_answer: {}", truncate_text(&record.correct_answer, 100));
    info!("explanation: {}", truncate_text(&record.explanation, 100));
    info!("url: {}", record.url);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_text;

    #[test]
    fn truncates_by_chars_not_bytes() {
        assert_eq!(truncate_text("管理管理管理", 2), "管理...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
