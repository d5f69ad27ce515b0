//! 投递层：邮件与聊天机器人回复

pub mod chat;
pub mod email;

#[cfg(test)]
pub(crate) mod line_stub;

pub use chat::{split_message, LineClient};
pub use email::{render_quiz_digest, render_quiz_html, render_word_email, EmailSender};
