//! YouTube 数据服务 - 业务能力层
//!
//! 只负责"查影片信息 / 搜索影片"能力（YouTube Data API v3）

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::VideoDescriptor;

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// 描述截取长度
const DESCRIPTION_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    published_at: String,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

fn descriptor(video_id: String, snippet: Snippet) -> VideoDescriptor {
    VideoDescriptor {
        video_id,
        title: snippet.title,
        description: snippet.description.chars().take(DESCRIPTION_CHARS).collect(),
        published_at: snippet.published_at,
    }
}

/// 从各种 YouTube 链接中取出 11 位影片 ID
///
/// 支持 `watch?v=`、`youtu.be/` 两种形式
pub fn extract_video_id(url: &str) -> Option<String> {
    let re = Regex::new(r"(?:v=|youtu\.be/)([\w-]{11})").ok()?;
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 解析 `videos.list` 的响应
pub fn parse_videos_response(body: &str) -> AppResult<Vec<VideoDescriptor>> {
    let response: ListResponse<VideoItem> = serde_json::from_str(body).map_err(ApiError::from)?;
    Ok(response
        .items
        .into_iter()
        .map(|item| descriptor(item.id, item.snippet))
        .collect())
}

/// 解析 `search.list` 的响应（忽略非影片结果）
pub fn parse_search_response(body: &str) -> AppResult<Vec<VideoDescriptor>> {
    let response: ListResponse<SearchItem> = serde_json::from_str(body).map_err(ApiError::from)?;
    Ok(response
        .items
        .into_iter()
        .filter_map(|item| item.id.video_id.map(|id| descriptor(id, item.snippet)))
        .collect())
}

/// YouTube 数据服务
pub struct YouTubeService {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl YouTubeService {
    pub fn new(config: &Config) -> Self {
        Self::with_base(config.youtube_api_key.clone(), YOUTUBE_API_BASE)
    }

    /// 指定 API 地址创建（便于指向代理或测试服务）
    pub fn with_base(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> AppResult<String> {
        let url = format!("{}/{}", self.api_base, endpoint);
        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;
        if !status.is_success() {
            return Err(ApiError::BadResponse {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(body)
    }

    /// 按影片 ID 查询信息，不存在时返回 `Ok(None)`
    pub async fn video_info(&self, video_id: &str) -> AppResult<Option<VideoDescriptor>> {
        debug!("查询影片信息: {}", video_id);
        let body = self
            .get(
                "videos",
                &[("part", "snippet".to_string()), ("id", video_id.to_string())],
            )
            .await?;
        Ok(parse_videos_response(&body)?.into_iter().next())
    }

    /// 通过链接取得影片信息，任何失败都返回 `None`
    pub async fn video_info_by_url(&self, url: &str) -> Option<VideoDescriptor> {
        let Some(video_id) = extract_video_id(url) else {
            error!("无法解析 YouTube 影片 ID: {}", url);
            return None;
        };

        match self.video_info(&video_id).await {
            Ok(Some(info)) => Some(info),
            Ok(None) => {
                error!("找不到该影片信息: {}", video_id);
                None
            }
            Err(e) => {
                error!("取得影片信息时发生错误: {}", e);
                None
            }
        }
    }

    /// 搜索最新的中等长度英文影片，失败时返回空列表
    pub async fn search_videos(&self, query: &str, max_results: u32) -> Vec<VideoDescriptor> {
        let params = [
            ("q", query.to_string()),
            ("part", "id,snippet".to_string()),
            ("maxResults", max_results.to_string()),
            ("order", "date".to_string()),
            ("type", "video".to_string()),
            ("videoDuration", "medium".to_string()),
            ("relevanceLanguage", "en".to_string()),
        ];

        let result = match self.get("search", &params).await {
            Ok(body) => parse_search_response(&body),
            Err(e) => Err(e),
        };

        match result {
            Ok(videos) => {
                info!("找到 {} 部影片", videos.len());
                videos
            }
            Err(e) => {
                error!("搜索 YouTube 影片时发生错误: {}", e);
                Vec::new()
            }
        }
    }
}
