use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use toeic_toolkit::browser::BrowserSession;
use toeic_toolkit::config::{Config, OutputFormat};
use toeic_toolkit::infrastructure::{HtmlSnapshot, PageSource};
use toeic_toolkit::logger;
use toeic_toolkit::models::QuestionRecord;
use toeic_toolkit::orchestrator::{question_url, ScrapeRunner};
use toeic_toolkit::output;
use toeic_toolkit::services::{build_backend, stat_parser, QuestionExtractor, SkipWriter, VocabService, YouTubeService};
use toeic_toolkit::workflow::{BrowserFetcher, QuestionFetcher, RetryPolicy};

const BASE_URL: &str = "https://app.yamol.tw/exam/125609";

const SELECTOR_PAGE: &str = r#"
<html><body>
  <div class="question-content">下列何者為台灣最高的山峰？請選出正確答案。</div>
  <ul>
    <li>(A) 玉山</li>
    <li>(B) 雪山</li>
    <li>(C) 合歡山</li>
    <li>(D) 阿里山</li>
  </ul>
  <div class="correct-answer">A</div>
  <div class="explanation">玉山主峰海拔 3952 公尺。</div>
</body></html>
"#;

const TEXT_PAGE: &str = r#"
<html><body>
  <p>開始 下列哪一個選項是質數？ 答案</p>
  <p>統計：A(2), B(31), C(5), D(1)</p>
</body></html>
"#;

/// 用静态 HTML 代替浏览器的抓取器，没有对应页面时返回错误
struct SnapshotFetcher {
    pages: HashMap<String, &'static str>,
    text_mode: bool,
}

#[async_trait]
impl QuestionFetcher for SnapshotFetcher {
    async fn fetch(&self, url: &str, question_number: usize) -> Result<QuestionRecord> {
        let html = self
            .pages
            .get(url)
            .ok_or_else(|| anyhow!("页面加载失败: {}", url))?;
        let snapshot = HtmlSnapshot::new(*html);

        if self.text_mode {
            let text = snapshot.body_text().await?;
            Ok(stat_parser::record_from_text(&text, url, question_number))
        } else {
            Ok(QuestionExtractor::new()
                .extract(&snapshot, url, question_number)
                .await)
        }
    }
}

#[tokio::test]
async fn selector_run_skips_missing_page_and_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = SnapshotFetcher {
        pages: HashMap::from([
            (question_url(BASE_URL, 1), SELECTOR_PAGE),
            (question_url(BASE_URL, 3), SELECTOR_PAGE),
        ]),
        text_mode: false,
    };
    let runner = ScrapeRunner::new(RetryPolicy::immediate(3), Duration::ZERO)
        .with_skip_writer(SkipWriter::with_path(dir.path().join("skipped.txt")));

    let report = runner.run(&fetcher, BASE_URL, 1, 3).await;

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.skipped_ids, vec![2]);
    assert_eq!(report.records[1].question_number, 3);
    assert_eq!(report.records[1].question_id, "3");
    assert_eq!(report.records[0].options.len(), 4);
    assert_eq!(report.records[0].correct_answer, "A");
    assert!(report.records[0].explanation.contains("3952"));

    let skipped = std::fs::read_to_string(dir.path().join("skipped.txt")).unwrap();
    assert!(skipped.contains("item.2"));

    let written = output::write_all(
        &report.records,
        dir.path(),
        &[OutputFormat::Json, OutputFormat::Xlsx, OutputFormat::Docx],
    );
    assert_eq!(written.len(), 3);
    assert!(written.iter().all(|path| path.exists()));

    let json = std::fs::read_to_string(&written[0]).unwrap();
    let parsed: Vec<QuestionRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report.records);
    assert!(json.contains("玉山"));
}

#[tokio::test]
async fn text_mode_uses_markers_and_statistics() {
    let url = question_url(BASE_URL, 7);
    let fetcher = SnapshotFetcher {
        pages: HashMap::from([(url.clone(), TEXT_PAGE)]),
        text_mode: true,
    };

    let record = fetcher.fetch(&url, 1).await.unwrap();
    assert_eq!(record.question_text, "下列哪一個選項是質數？");
    assert_eq!(record.correct_answer, "B");
    assert_eq!(record.question_id, "7");
}

#[tokio::test]
#[ignore] // 需要本机 Chrome：cargo test -- --ignored
async fn test_scrape_single_live_question() {
    logger::init();
    let config = Config {
        total_questions: 1,
        ..Config::from_env().expect("加载配置失败")
    };

    let session = BrowserSession::open(&config).await.expect("启动浏览器失败");
    let fetcher = BrowserFetcher::new(session.executor(), &config);
    let url = question_url(&config.base_url, config.start_id);

    let record = fetcher.fetch(&url, 1).await.expect("抓取题目失败");
    drop(fetcher);
    session.close().await;

    assert_eq!(record.question_id, config.start_id.to_string());
    assert!(!record.question_text.is_empty());
}

#[tokio::test]
#[ignore] // 需要 YOUTUBE_API_KEY
async fn test_youtube_video_info() {
    logger::init();
    dotenv::dotenv().ok();
    let config = Config::from_env().expect("加载配置失败");

    let youtube = YouTubeService::new(&config);
    let info = youtube
        .video_info_by_url("https://youtu.be/plbqT4dBNwo")
        .await
        .expect("应该能取得影片信息");

    assert_eq!(info.video_id, "plbqT4dBNwo");
    assert!(!info.title.is_empty());
}

#[tokio::test]
#[ignore] // 需要 LLM 服务（GEMINI_API_KEY 或本地 Ollama）
async fn test_extract_words_live() {
    logger::init();
    dotenv::dotenv().ok();
    let config = Config::from_env().expect("加载配置失败");

    let vocab = VocabService::new(build_backend(&config));
    let words = vocab
        .extract_words(
            "The management team reviewed the quarterly budget and negotiated a new contract with the supplier.",
            "Business English",
        )
        .await;

    assert!(!words.is_empty());
}
