//! 页面纯文字解析 - 业务能力层
//!
//! 适用于把题目和作答统计直接渲染成文字的页面：
//! 题目位于"開始"与"答案"之间，答案取"統計："里人数最多的选项。

use regex::Regex;

use crate::models::QuestionRecord;

/// 解析页面文字，返回 (题目, 统计答案)
///
/// 找不到的部分返回空字符串
pub fn parse_exam_text(page_text: &str) -> (String, String) {
    let question = Regex::new(r"(?s)開始(.*?)答案")
        .ok()
        .and_then(|re| re.captures(page_text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    (question, stat_answer(page_text))
}

/// 统计中人数最多的选项；人数相同时取先出现的
pub fn stat_answer(page_text: &str) -> String {
    let (Ok(stat_re), Ok(option_re)) = (
        Regex::new(r"統計：([A-Z]\(\d+\)(?:, [A-Z]\(\d+\))*)"),
        Regex::new(r"([A-Z])\((\d+)\)"),
    ) else {
        return String::new();
    };
    let Some(stats) = stat_re.captures(page_text).and_then(|caps| caps.get(1)) else {
        return String::new();
    };

    let mut best: Option<(&str, u64)> = None;
    for caps in option_re.captures_iter(stats.as_str()) {
        let (Some(label), Some(count)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let count: u64 = count.as_str().parse().unwrap_or(0);
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((label.as_str(), count)),
        }
    }

    best.map(|(label, _)| label.to_string()).unwrap_or_default()
}

/// 用页面文字构建题目记录（只填题目和答案）
pub fn record_from_text(page_text: &str, url: &str, question_number: usize) -> QuestionRecord {
    let (question_text, correct_answer) = parse_exam_text(page_text);
    QuestionRecord {
        question_text,
        correct_answer,
        ..QuestionRecord::new(url, question_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "阿摩線上測驗 開始測驗\n1. The package arrived ____ schedule.\n(A) on (B) in\n答案：登入後查看\n統計：A(120), B(15), C(3), D(1)";

    #[test]
    fn question_between_markers() {
        let (question, answer) = parse_exam_text(PAGE);
        assert_eq!(question, "測驗\n1. The package arrived ____ schedule.\n(A) on (B) in");
        assert_eq!(answer, "A");
    }

    #[test]
    fn highest_count_wins() {
        assert_eq!(stat_answer("統計：A(1), B(9), C(3)"), "B");
    }

    #[test]
    fn ties_keep_first_label() {
        assert_eq!(stat_answer("統計：A(2), B(7), C(7), D(0)"), "B");
    }

    #[test]
    fn missing_parts_are_empty() {
        assert_eq!(parse_exam_text("nothing here"), (String::new(), String::new()));
    }

    #[test]
    fn record_keeps_id_and_url() {
        let record = record_from_text(PAGE, "https://x?info=item.3300000", 1);
        assert_eq!(record.question_id, "3300000");
        assert_eq!(record.correct_answer, "A");
        assert!(record.options.is_empty());
    }
}
