//! 聊天机器人 Webhook 服务 - 编排层
//!
//! `POST /callback` 收到消息事件后立即返回 200，
//! 每条文字消息交给一个独立的 tokio 任务处理，不等待也不取消。

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::delivery::LineClient;
use crate::services::youtube_service::extract_video_id;
use crate::workflow::VocabFlow;

const USAGE_HINT: &str = "请传送 YouTube 影片链接，我会帮你整理影片中的 TOEIC 单字。";

#[derive(Debug, Default, Deserialize)]
struct CallbackBody {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    #[serde(rename = "type")]
    kind: String,
    reply_token: Option<String>,
    source: Option<EventSource>,
    message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventSource {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// 一条需要回复的文字消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessageEvent {
    pub reply_token: String,
    pub user_id: Option<String>,
    pub text: String,
}

/// 从回调内容中取出文字消息事件，其余事件忽略
pub fn text_events(body: &str) -> Result<Vec<TextMessageEvent>> {
    let body: CallbackBody = serde_json::from_str(body).context("无法解析 webhook 内容")?;
    Ok(body
        .events
        .into_iter()
        .filter(|event| event.kind == "message")
        .filter_map(|event| {
            let message = event.message?;
            if message.kind != "text" {
                return None;
            }
            Some(TextMessageEvent {
                reply_token: event.reply_token?,
                user_id: event.source.and_then(|source| source.user_id),
                text: message.text,
            })
        })
        .collect())
}

/// 消息中第一个 YouTube 影片链接
pub fn find_video_url(text: &str) -> Option<&str> {
    text.split_whitespace().find(|token| {
        (token.contains("youtube.com/") || token.contains("youtu.be/"))
            && extract_video_id(token).is_some()
    })
}

/// 后台任务共享的只读服务
#[derive(Clone)]
pub struct WebhookState {
    flow: Arc<VocabFlow>,
    line: Arc<LineClient>,
}

impl WebhookState {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(VocabFlow::new(config), LineClient::new(config))
    }

    pub fn from_parts(flow: VocabFlow, line: LineClient) -> Self {
        Self {
            flow: Arc::new(flow),
            line: Arc::new(line),
        }
    }
}

async fn handle_message(state: WebhookState, event: TextMessageEvent) {
    let reply = match find_video_url(&event.text) {
        Some(url) => state.flow.chat_reply_for_url(url).await.message,
        None => USAGE_HINT.to_string(),
    };

    let sent = state
        .line
        .send_text(&event.reply_token, event.user_id.as_deref(), &reply)
        .await;
    if sent {
        debug!("已回复消息: {}", event.text);
    } else {
        warn!("回复消息失败: {}", event.text);
    }
}

async fn callback(State(state): State<WebhookState>, body: String) -> StatusCode {
    let events = match text_events(&body) {
        Ok(events) => events,
        Err(e) => {
            warn!("{:#}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    for event in events {
        info!("收到消息: {}", event.text);
        tokio::spawn(handle_message(state.clone(), event));
    }
    StatusCode::OK
}

async fn health() -> &'static str {
    "OK"
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/callback", post(callback))
        .with_state(state)
}

/// 启动 webhook 服务，直到进程结束
pub async fn serve(config: &Config) -> Result<()> {
    let state = WebhookState::new(config);
    let addr = ("0.0.0.0", config.webhook_port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法监听端口 {}", config.webhook_port))?;

    info!("🚀 Webhook 服务已启动: http://0.0.0.0:{}/callback", config.webhook_port);
    axum::serve(listener, router(state))
        .await
        .context("Webhook 服务异常退出")?;
    Ok(())
}
