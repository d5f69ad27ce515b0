//! 聊天机器人回复（LINE Messaging API）
//!
//! 长文字按字符数切段；一次回复最多 5 条消息，其余走推送接口

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::{AppError, DeliveryError};

pub const LINE_API_BASE: &str = "https://api.line.me/v2/bot/message";

/// 单条文字消息的字符上限
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// 单次回复 / 推送调用最多携带的消息数
pub const MAX_MESSAGES_PER_CALL: usize = 5;

/// 按字符数切分文字
///
/// 长度为 L 的文字得到 ceil(L / max_chars) 段，空文字得到 0 段，
/// 各段依序拼接即为原文
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for c in text.chars() {
        current.push(c);
        count += 1;
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: Vec<TextMessage<'a>>,
}

fn text_messages(chunks: &[String]) -> Vec<TextMessage<'_>> {
    chunks
        .iter()
        .map(|text| TextMessage { kind: "text", text })
        .collect()
}

/// LINE 消息客户端
pub struct LineClient {
    client: reqwest::Client,
    access_token: String,
    api_base: String,
}

impl LineClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base(config.line_channel_access_token.clone(), LINE_API_BASE)
    }

    pub fn with_base(access_token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<()> {
        let url = format!("{}/{}", self.api_base, endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::ChatApiFailed {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(())
    }

    /// 使用回复令牌回复（最多 5 条）
    pub async fn reply(&self, reply_token: &str, chunks: &[String]) -> Result<()> {
        debug!("回复 {} 条消息", chunks.len());
        let request = ReplyRequest {
            reply_token,
            messages: text_messages(chunks),
        };
        self.post("reply", &request).await
    }

    /// 主动推送给指定用户（最多 5 条）
    pub async fn push(&self, to: &str, chunks: &[String]) -> Result<()> {
        debug!("推送 {} 条消息给 {}", chunks.len(), to);
        let request = PushRequest {
            to,
            messages: text_messages(chunks),
        };
        self.post("push", &request).await
    }

    /// 发送一段可能很长的文字
    ///
    /// 第一批消息用回复令牌；回复失败且知道发送者时改用推送。
    /// 其余批次一律推送给发送者。全部成功时返回 `true`
    pub async fn send_text(&self, reply_token: &str, user_id: Option<&str>, text: &str) -> bool {
        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        let mut batches = chunks.chunks(MAX_MESSAGES_PER_CALL);

        let Some(first) = batches.next() else {
            warn!("回复内容为空，跳过发送");
            return true;
        };

        let mut ok = true;
        if let Err(e) = self.reply(reply_token, first).await {
            warn!("回复消息失败: {}", e);
            ok = match user_id {
                Some(to) => self.push_logged(to, first).await,
                None => false,
            };
        }

        for batch in batches {
            match user_id {
                Some(to) => ok &= self.push_logged(to, batch).await,
                None => {
                    error!("消息超过 {} 条但不知道发送者，剩余内容无法推送", MAX_MESSAGES_PER_CALL);
                    return false;
                }
            }
        }
        ok
    }

    async fn push_logged(&self, to: &str, batch: &[String]) -> bool {
        match self.push(to, batch).await {
            Ok(()) => true,
            Err(e) => {
                error!("推送消息失败: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::line_stub::LineStub;
    use axum::http::StatusCode;

    fn assert_chunking(text: &str, max: usize) {
        let chunks = split_message(text, max);
        let len = text.chars().count();
        assert_eq!(chunks.len(), len.div_ceil(max), "length {}", len);
        assert!(chunks.iter().all(|c| c.chars().count() <= max));
        assert!(chunks.iter().all(|c| !c.is_empty()));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn chunk_count_is_ceiling_of_length() {
        for len in [0, 1, 1999, 2000, 2001, 4000, 4001, 10_500] {
            assert_chunking(&"a".repeat(len), MAX_MESSAGE_CHARS);
        }
    }

    #[test]
    fn chunks_count_characters_not_bytes() {
        let text = "單字".repeat(1500);
        let chunks = split_message(&text, MAX_MESSAGE_CHARS);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 2000);
        assert_chunking(&text, MAX_MESSAGE_CHARS);
        assert_chunking("混合 mixed 文字 text 🎥", 3);
    }

    #[test]
    fn empty_message_yields_no_chunks() {
        assert!(split_message("", MAX_MESSAGE_CHARS).is_empty());
    }

    #[test]
    fn request_bodies_match_line_format() {
        let chunks = vec!["hello".to_string()];
        let reply = serde_json::to_value(ReplyRequest {
            reply_token: "token",
            messages: text_messages(&chunks),
        })
        .unwrap();
        assert_eq!(
            reply,
            serde_json::json!({"replyToken": "token", "messages": [{"type": "text", "text": "hello"}]})
        );

        let push = serde_json::to_value(PushRequest {
            to: "U123",
            messages: text_messages(&chunks),
        })
        .unwrap();
        assert_eq!(push["to"], "U123");
    }

    #[tokio::test]
    async fn empty_text_sends_nothing() {
        let client = LineClient::with_base("token", "http://127.0.0.1:9");
        assert!(client.send_text("reply-token", None, "").await);
    }

    fn message_count(body: &serde_json::Value) -> usize {
        body["messages"].as_array().map(Vec::len).unwrap_or(0)
    }

    #[tokio::test]
    async fn long_text_replies_five_then_pushes_rest() {
        let (stub, base) = LineStub::start(StatusCode::OK).await;
        let client = LineClient::with_base("token", base);
        let text = "x".repeat(12_001);

        assert!(client.send_text("reply-token", Some("U123"), &text).await);

        let calls = stub.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "reply");
        assert_eq!(calls[0].1["replyToken"], "reply-token");
        assert_eq!(message_count(&calls[0].1), 5);
        assert_eq!(calls[1].0, "push");
        assert_eq!(calls[1].1["to"], "U123");
        assert_eq!(message_count(&calls[1].1), 2);
        assert_eq!(calls[1].1["messages"][1]["text"], "x");
    }

    #[tokio::test]
    async fn failed_reply_falls_back_to_push() {
        let (stub, base) = LineStub::start(StatusCode::BAD_REQUEST).await;
        let client = LineClient::with_base("token", base);

        assert!(client.send_text("expired-token", Some("U123"), "hello").await);

        let calls = stub.calls();
        let endpoints: Vec<&str> = calls.iter().map(|(endpoint, _)| endpoint.as_str()).collect();
        assert_eq!(endpoints, vec!["reply", "push"]);
        assert_eq!(calls[1].1["messages"][0]["text"], "hello");
    }

    #[tokio::test]
    async fn failed_reply_without_sender_reports_failure() {
        let (stub, base) = LineStub::start(StatusCode::BAD_REQUEST).await;
        let client = LineClient::with_base("token", base);

        assert!(!client.send_text("expired-token", None, "hello").await);
        assert_eq!(stub.calls().len(), 1);
    }
}
