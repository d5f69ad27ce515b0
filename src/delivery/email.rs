//! 邮件投递
//!
//! HTML 模板靠字符串拼接生成，发送走 STARTTLS + 登录认证的 SMTP 会话

use std::fmt::Write as _;

use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::config::Config;
use crate::error::DeliveryError;
use crate::models::{QuizItem, VideoDescriptor, VocabEntry};

const WORD_EMAIL_STYLE: &str = r#"
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        .header { background-color: #4CAF50; color: white; padding: 20px; text-align: center; }
        .content { padding: 20px; }
        .word-item { border: 1px solid #ddd; margin: 10px 0; padding: 15px; border-radius: 5px; background-color: #f9f9f9; }
        .word { font-size: 18px; font-weight: bold; color: #2196F3; }
        .chinese { color: #FF9800; font-weight: bold; }
        .pos { color: #9C27B0; font-style: italic; }
        .example { color: #555; margin-top: 5px; }
        .video-info { background-color: #e3f2fd; padding: 15px; border-radius: 5px; margin-bottom: 20px; }
"#;

/// 转义 HTML 特殊字符
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 每日单字邮件
///
/// `date` 为邮件标题中显示的日期，例如 `2024-05-01`
pub fn render_word_email(words: &[VocabEntry], video: &VideoDescriptor, date: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<html>
<head>
    <style>{style}</style>
</head>
<body>
    <div class="header">
        <h1>📚 每日 TOEIC 单字学习 - {date}</h1>
    </div>
    <div class="content">
        <div class="video-info">
            <h3>🎥 今日学习影片</h3>
            <p><strong>标题:</strong> {title}</p>
            <p><strong>发布时间:</strong> {published}</p>
            <p><strong>YouTube 链接:</strong> <a href="{watch_url}">观看影片</a></p>
        </div>
        <h3>📝 今日 {count} 个 TOEIC 重点单字</h3>
"#,
        style = WORD_EMAIL_STYLE,
        date = escape_html(date),
        title = escape_html(&video.title),
        published = escape_html(video.published_date()),
        watch_url = escape_html(&video.watch_url()),
        count = words.len(),
    );

    for (i, word) in words.iter().enumerate() {
        let _ = write!(
            html,
            r#"        <div class="word-item">
            <div class="word">{}. {}</div>
            <div class="chinese">中文: {}</div>
            <div class="pos">词性: {}</div>
            <div class="example">例句: {}</div>
        </div>
"#,
            i + 1,
            escape_html(&word.word),
            escape_html(&word.translation),
            escape_html(&word.part_of_speech),
            escape_html(&word.example),
        );
    }

    html.push_str(
        r#"        <div style="margin-top: 30px; padding: 15px; background-color: #fff3cd; border-radius: 5px;">
            <p><strong>💡 学习建议:</strong></p>
            <ul>
                <li>建议观看完整影片来了解单字的实际使用情境</li>
                <li>每天复习 5-10 个单字，加深记忆</li>
                <li>尝试在日常对话中使用这些单字</li>
            </ul>
        </div>
    </div>
</body>
</html>
"#,
    );
    html
}

/// 练习题片段，没有题目时返回空字符串
pub fn render_quiz_html(quiz: &[QuizItem]) -> String {
    if quiz.is_empty() {
        return String::new();
    }

    let mut html = String::from("<h3>练习题：</h3>\n<ol>\n");
    for item in quiz {
        let _ = writeln!(html, "    <li>\n        <p>{}</p>", escape_html(&item.question));
        for (label, option) in item.options.labeled() {
            let _ = writeln!(html, "        <p>{}) {}</p>", label, escape_html(option));
        }
        let _ = write!(
            html,
            "        <p><strong>正确答案：{}</strong></p>\n        <p>解释：{}</p>\n    </li>\n",
            escape_html(&item.correct_answer),
            escape_html(&item.explanation),
        );
    }
    html.push_str("</ol>\n");
    html
}

/// 单字 + 练习题邮件正文
pub fn render_quiz_digest(video_title: &str, words: &[VocabEntry], quiz: &[QuizItem]) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<h2>今日 TOEIC 单字学习</h2>\n<p>影片标题：{}</p>\n\n<h3>单字列表：</h3>\n<ul>\n",
        escape_html(video_title)
    );
    for word in words {
        let _ = write!(
            html,
            "    <li>\n        <strong>{}</strong> ({}) - {}<br>\n        例句：{}\n    </li>\n",
            escape_html(&word.word),
            escape_html(&word.part_of_speech),
            escape_html(&word.translation),
            escape_html(&word.example),
        );
    }
    html.push_str("</ul>\n");
    html.push_str(&render_quiz_html(quiz));
    html
}

/// SMTP 邮件发送器
pub struct EmailSender {
    host: String,
    port: u16,
    sender: String,
    password: String,
}

impl EmailSender {
    pub fn new(config: &Config) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            sender: config.sender_email.clone(),
            password: config.sender_password.clone(),
        }
    }

    fn build_message(&self, subject: &str, html: &str, recipient: &str) -> Result<Message> {
        let from: Mailbox = self
            .sender
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(self.sender.clone()))?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(recipient.to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;
        Ok(message)
    }

    async fn try_send(&self, subject: &str, html: &str, recipient: &str) -> Result<()> {
        let message = self.build_message(subject, html, recipient)?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| DeliveryError::SmtpFailed(e.to_string()))?
            .port(self.port)
            .credentials(Credentials::new(self.sender.clone(), self.password.clone()))
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| DeliveryError::SmtpFailed(e.to_string()))?;
        Ok(())
    }

    /// 发送 HTML 邮件，失败时记录日志并返回 `false`
    pub async fn send(&self, subject: &str, html: &str, recipient: &str) -> bool {
        match self.try_send(subject, html, recipient).await {
            Ok(()) => {
                info!("✓ Email 发送成功: {}", recipient);
                true
            }
            Err(e) => {
                error!("发送 Email 时发生错误: {}", e);
                false
            }
        }
    }
}
