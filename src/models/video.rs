use serde::{Deserialize, Serialize};

/// YouTube 影片基本信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    pub video_id: String,
    pub title: String,
    /// 描述的前 200 个字符
    pub description: String,
    /// 发布时间（RFC3339，原样保留 API 返回值）
    pub published_at: String,
}

impl VideoDescriptor {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// 发布日期（`published_at` 的前 10 个字符）
    pub fn published_date(&self) -> &str {
        self.published_at
            .char_indices()
            .nth(10)
            .map(|(idx, _)| &self.published_at[..idx])
            .unwrap_or(&self.published_at)
    }
}

/// 一段字幕
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// 开始时间（秒）
    pub start: f64,
    /// 持续时间（秒）
    pub duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_date_keeps_day_part() {
        let video = VideoDescriptor {
            video_id: "plbqT4dBNwo".into(),
            published_at: "2024-05-01T12:00:00Z".into(),
            ..Default::default()
        };
        assert_eq!(video.published_date(), "2024-05-01");
        assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=plbqT4dBNwo");
    }

    #[test]
    fn short_timestamp_is_returned_whole() {
        let video = VideoDescriptor {
            published_at: "2024".into(),
            ..Default::default()
        };
        assert_eq!(video.published_date(), "2024");
    }
}
