//! 本地 Ollama 模型服务 - 业务能力层
//!
//! 直接调用 `/api/chat`，兼容一次性 JSON 与逐行流式（NDJSON）两种返回

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, LlmError};
use crate::services::LlmBackend;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

/// 合并 `/api/chat` 的返回内容
///
/// 每行一个 JSON 对象，依次拼接 `message.content`；空行忽略
pub fn parse_chat_body(body: &str) -> Result<String> {
    let mut content = String::new();
    let mut parsed_any = false;

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let chunk: ChatChunk = serde_json::from_str(line)?;
        if let Some(err) = chunk.error {
            return Err(anyhow!("Ollama 返回错误: {}", err));
        }
        if let Some(message) = chunk.message {
            content.push_str(&message.content);
        }
        parsed_any = true;
    }

    if !parsed_any {
        return Err(anyhow!("Ollama 返回内容为空"));
    }
    Ok(content)
}

/// Ollama 服务
pub struct OllamaService {
    client: reqwest::Client,
    chat_url: String,
    model_name: String,
    temperature: f32,
}

impl OllamaService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            chat_url: format!("{}/api/chat", config.ollama_base_url.trim_end_matches('/')),
            model_name: config.ollama_model.clone(),
            temperature: 0.3,
        }
    }
}

#[async_trait]
impl LlmBackend for OllamaService {
    async fn complete(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        debug!("调用 Ollama，模型: {}", self.model_name);

        let mut messages = Vec::new();
        if let Some(system) = system_message {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user_message,
        });

        let payload = json!({
            "model": self.model_name,
            "messages": messages,
            "stream": false,
            "options": { "temperature": self.temperature },
        });

        let response = self
            .client
            .post(&self.chat_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!("无法连接 Ollama ({}): {}", self.chat_url, e);
                AppError::llm_api_failed(&self.model_name, e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::llm_api_failed(
                &self.model_name,
                format!("HTTP {}: {}", status, body),
            )
            .into());
        }

        let content = parse_chat_body(&body)?;
        if content.trim().is_empty() {
            return Err(LlmError::EmptyContent {
                model: self.model_name.clone(),
            }
            .into());
        }
        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_response_object() {
        let body = r#"{"model":"llama3.2","message":{"role":"assistant","content":"[1, 2]"},"done":true}"#;
        assert_eq!(parse_chat_body(body).unwrap(), "[1, 2]");
    }

    #[test]
    fn streamed_lines_are_concatenated() {
        let body = "{\"message\":{\"content\":\"Quantum \"},\"done\":false}\n\n{\"message\":{\"content\":\"physics\"},\"done\":false}\n{\"done\":true}\n";
        assert_eq!(parse_chat_body(body).unwrap(), "Quantum physics");
    }

    #[test]
    fn error_field_is_reported() {
        let err = parse_chat_body(r#"{"error":"model 'llama3.2' not found"}"#).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn empty_or_garbage_body_fails() {
        assert!(parse_chat_body("  \n").is_err());
        assert!(parse_chat_body("<html>").is_err());
    }
}
