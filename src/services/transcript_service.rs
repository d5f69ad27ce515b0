//! 字幕服务 - 业务能力层
//!
//! 从影片页面找到字幕轨道，下载 timedtext XML 并合并成纯文字

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::models::TranscriptSegment;

const WATCH_URL: &str = "https://www.youtube.com/watch";
const CAPTION_MARKER: &str = "\"captionTracks\":";

/// 影片页面中嵌入的一条字幕轨道
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    /// 自动生成的字幕为 `asr`
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// 从影片页面 HTML 中取出字幕轨道列表
pub fn extract_caption_tracks(html: &str) -> Vec<CaptionTrack> {
    let Some(pos) = html.find(CAPTION_MARKER) else {
        return Vec::new();
    };
    let rest = &html[pos + CAPTION_MARKER.len()..];

    // 只解析紧随其后的第一个 JSON 数组
    serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .and_then(|parsed| parsed.ok())
        .unwrap_or_default()
}

/// 选择字幕轨道：人工英文 > 自动英文 > 第一条
pub fn pick_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let matches_lang = |t: &&CaptionTrack| t.language_code.starts_with(language);
    tracks
        .iter()
        .filter(matches_lang)
        .find(|t| !t.is_generated())
        .or_else(|| tracks.iter().find(matches_lang))
        .or_else(|| tracks.first())
}

/// 解析 timedtext XML
pub fn parse_timedtext(xml: &str) -> Result<Vec<TranscriptSegment>> {
    let doc = roxmltree::Document::parse(xml).context("字幕 XML 解析失败")?;

    let segments = doc
        .descendants()
        .filter(|node| node.has_tag_name("text"))
        .filter_map(|node| {
            let raw: String = node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect();
            let text = unescape_html(&raw)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                text,
                start: node
                    .attribute("start")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.0),
                duration: node
                    .attribute("dur")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.0),
            })
        })
        .collect();

    Ok(segments)
}

/// timedtext 里的文字经过二次转义，这里还原常见实体
fn unescape_html(text: &str) -> String {
    text.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// 合并字幕段落为一整段文字
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 字幕服务
pub struct TranscriptService {
    client: reqwest::Client,
    language: String,
}

impl TranscriptService {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            language: "en".to_string(),
        }
    }

    /// 下载影片字幕段落
    pub async fn fetch_segments(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        let html = self
            .client
            .get(WATCH_URL)
            .query(&[("v", video_id)])
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let tracks = extract_caption_tracks(&html);
        debug!("影片 {} 共有 {} 条字幕轨道", video_id, tracks.len());
        let track = pick_track(&tracks, &self.language)
            .ok_or_else(|| anyhow!("影片 {} 没有可用字幕", video_id))?;

        let xml = self
            .client
            .get(&track.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_timedtext(&xml)
    }

    /// 取得整段字幕文字，失败或为空时返回 `None`
    pub async fn fetch_text(&self, video_id: &str) -> Option<String> {
        match self.fetch_segments(video_id).await {
            Ok(segments) if !segments.is_empty() => Some(join_segments(&segments)),
            Ok(_) => {
                warn!("影片 {} 字幕为空", video_id);
                None
            }
            Err(e) => {
                error!("无法获取字幕：{}", e);
                None
            }
        }
    }
}

impl Default for TranscriptService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_tracks_are_read_from_player_response() {
        let html = r#"<script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en-GB","languageCode":"en-GB"}],"audioTracks":[]}}};</script>"#;
        let tracks = extract_caption_tracks(html);
        assert_eq!(tracks.len(), 2);
        assert_eq!(
            tracks[0].base_url,
            "https://www.youtube.com/api/timedtext?v=abc&lang=en"
        );

        // 人工字幕优先于自动字幕
        let picked = pick_track(&tracks, "en").unwrap();
        assert_eq!(picked.language_code, "en-GB");
    }

    #[test]
    fn missing_captions_give_no_tracks() {
        assert!(extract_caption_tracks("<html>no captions</html>").is_empty());
        assert!(pick_track(&[], "en").is_none());
    }

    #[test]
    fn falls_back_to_first_track_in_other_language() {
        let tracks = vec![CaptionTrack {
            base_url: "u".into(),
            language_code: "ja".into(),
            kind: None,
        }];
        assert_eq!(pick_track(&tracks, "en").unwrap().language_code, "ja");
    }

    #[test]
    fn timedtext_is_parsed_and_unescaped() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="2.1">Welcome to the &amp;#39;quarterly&amp;#39;
meeting</text><text start="2.6" dur="1.0"></text><text start="3.6" dur="1.5">Profit &amp;amp; loss</text></transcript>"#;
        let segments = parse_timedtext(xml).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Welcome to the 'quarterly' meeting");
        assert_eq!(segments[0].start, 0.5);
        assert_eq!(segments[1].text, "Profit & loss");
        assert_eq!(
            join_segments(&segments),
            "Welcome to the 'quarterly' meeting Profit & loss"
        );
    }

    #[test]
    fn broken_xml_is_an_error() {
        assert!(parse_timedtext("<transcript><text>").is_err());
    }
}
