//! 程序配置
//!
//! 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量（含 `.env`）

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError, FileError};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "toolkit.toml";

/// 题目抽取方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// 按 CSS 选择器列表逐个尝试
    Selector,
    /// 从页面纯文本中按标记截取题目和统计答案
    Text,
}

impl FromStr for ExtractMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "selector" => Ok(Self::Selector),
            "text" => Ok(Self::Text),
            other => Err(format!("未知的抽取方式: {}", other)),
        }
    }
}

/// 输出文件格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Xlsx,
    Docx,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Docx => "docx",
        }
    }

    /// 解析逗号分隔的格式列表，例如 `json,xlsx`
    pub fn parse_list(s: &str) -> Result<Vec<Self>, String> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Self::from_str)
            .collect()
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "docx" | "word" => Ok(Self::Docx),
            other => Err(format!("未知的输出格式: {}", other)),
        }
    }
}

/// LLM 提供方
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Gemini（OpenAI 兼容接口）
    Gemini,
    /// 本地 Ollama
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!("未知的 LLM 提供方: {}", other)),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Gemini => write!(f, "gemini"),
            LlmProvider::Ollama => write!(f, "ollama"),
        }
    }
}

/// 需要检查必需环境变量的子命令
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    Scrape,
    Vocab { email: bool },
    Daily,
    Serve,
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 爬虫配置 ---
    /// 题目页面基础 URL，实际地址为 `{base_url}?info=item.{id}`
    pub base_url: String,
    pub start_id: u64,
    pub total_questions: usize,
    pub extract_mode: ExtractMode,
    /// 是否使用无头模式
    pub headless: bool,
    /// 设置后连接已启动的浏览器，而不是自行启动
    pub browser_debug_port: Option<u16>,
    pub chrome_executable: Option<String>,
    /// 页面加载后的等待时间
    pub page_settle_ms: u64,
    /// 两道题之间的间隔
    pub item_delay_ms: u64,
    pub retry_attempts: usize,
    pub retry_delay_ms: u64,
    pub output_dir: PathBuf,
    pub output_formats: Vec<OutputFormat>,
    pub skip_log_file: String,
    // --- LLM 配置 ---
    pub llm_provider: LlmProvider,
    pub gemini_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    // --- YouTube 配置 ---
    pub youtube_api_key: String,
    pub youtube_search_query: String,
    pub youtube_max_results: u32,
    // --- 邮件配置 ---
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
    // --- 聊天机器人配置 ---
    pub line_channel_access_token: String,
    pub webhook_port: u16,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://app.yamol.tw/exam/125609".to_string(),
            start_id: 3399058,
            total_questions: 80,
            extract_mode: ExtractMode::Selector,
            headless: true,
            browser_debug_port: None,
            chrome_executable: None,
            page_settle_ms: 3000,
            item_delay_ms: 2000,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            output_dir: PathBuf::from("."),
            output_formats: vec![OutputFormat::Json, OutputFormat::Xlsx],
            skip_log_file: "skipped.txt".to_string(),
            llm_provider: LlmProvider::Gemini,
            gemini_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            youtube_api_key: String::new(),
            youtube_search_query: "AI artificial intelligence".to_string(),
            youtube_max_results: 5,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender_email: String::new(),
            sender_password: String::new(),
            recipient_email: String::new(),
            line_channel_access_token: String::new(),
            webhook_port: 8000,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载配置
    ///
    /// `path` 为 `None` 时，若当前目录存在 `toolkit.toml` 则读取它。
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(p) => Self::from_toml_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// 仅从环境变量读取（未设置的项使用默认值）
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// 解析 TOML 配置文件
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    /// 用 `lookup` 提供的值覆盖配置，`lookup` 一般为环境变量
    pub fn with_overrides<F>(mut self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = get("START_ID") {
            self.start_id = parse_var("START_ID", &v, "u64")?;
        }
        if let Some(v) = get("TOTAL_QUESTIONS") {
            self.total_questions = parse_var("TOTAL_QUESTIONS", &v, "usize")?;
        }
        if let Some(v) = get("EXTRACT_MODE") {
            self.extract_mode = parse_var("EXTRACT_MODE", &v, "selector|text")?;
        }
        if let Some(v) = get("HEADLESS") {
            self.headless = parse_var("HEADLESS", &v, "bool")?;
        }
        if let Some(v) = get("BROWSER_DEBUG_PORT") {
            self.browser_debug_port = Some(parse_var("BROWSER_DEBUG_PORT", &v, "u16")?);
        }
        if let Some(v) = get("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = get("PAGE_SETTLE_MS") {
            self.page_settle_ms = parse_var("PAGE_SETTLE_MS", &v, "u64")?;
        }
        if let Some(v) = get("ITEM_DELAY_MS") {
            self.item_delay_ms = parse_var("ITEM_DELAY_MS", &v, "u64")?;
        }
        if let Some(v) = get("RETRY_ATTEMPTS") {
            self.retry_attempts = parse_var("RETRY_ATTEMPTS", &v, "usize")?;
        }
        if let Some(v) = get("RETRY_DELAY_MS") {
            self.retry_delay_ms = parse_var("RETRY_DELAY_MS", &v, "u64")?;
        }
        if let Some(v) = get("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get("OUTPUT_FORMATS") {
            self.output_formats =
                OutputFormat::parse_list(&v).map_err(|_| ConfigError::EnvVarParseFailed {
                    var_name: "OUTPUT_FORMATS".to_string(),
                    value: v.clone(),
                    expected_type: "json,xlsx,docx",
                })?;
        }
        if let Some(v) = get("SKIP_LOG_FILE") {
            self.skip_log_file = v;
        }
        if let Some(v) = get("LLM_PROVIDER") {
            self.llm_provider = parse_var("LLM_PROVIDER", &v, "gemini|ollama")?;
        }
        if let Some(v) = get("GEMINI_API_KEY") {
            self.gemini_api_key = v;
        }
        if let Some(v) = get("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = get("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = get("OLLAMA_BASE_URL") {
            self.ollama_base_url = v;
        }
        if let Some(v) = get("OLLAMA_MODEL") {
            self.ollama_model = v;
        }
        if let Some(v) = get("YOUTUBE_API_KEY") {
            self.youtube_api_key = v;
        }
        if let Some(v) = get("YOUTUBE_SEARCH_QUERY") {
            self.youtube_search_query = v;
        }
        if let Some(v) = get("YOUTUBE_MAX_RESULTS") {
            self.youtube_max_results = parse_var("YOUTUBE_MAX_RESULTS", &v, "u32")?;
        }
        if let Some(v) = get("SMTP_HOST") {
            self.smtp_host = v;
        }
        if let Some(v) = get("SMTP_PORT") {
            self.smtp_port = parse_var("SMTP_PORT", &v, "u16")?;
        }
        if let Some(v) = get("SENDER_EMAIL") {
            self.sender_email = v;
        }
        if let Some(v) = get("SENDER_PASSWORD") {
            self.sender_password = v;
        }
        if let Some(v) = get("RECIPIENT_EMAIL") {
            self.recipient_email = v;
        }
        if let Some(v) = get("LINE_CHANNEL_ACCESS_TOKEN") {
            self.line_channel_access_token = v;
        }
        if let Some(v) = get("WEBHOOK_PORT") {
            self.webhook_port = parse_var("WEBHOOK_PORT", &v, "u16")?;
        }
        if let Some(v) = get("VERBOSE_LOGGING") {
            self.verbose_logging = parse_var("VERBOSE_LOGGING", &v, "bool")?;
        }

        Ok(self)
    }

    /// 列出指定子命令缺少的必需环境变量
    pub fn missing_for(&self, task: Task) -> Vec<&'static str> {
        let mut required: Vec<(&'static str, &str)> = Vec::new();

        match task {
            Task::Scrape => required.push(("BASE_URL", self.base_url.as_str())),
            Task::Vocab { email } => {
                required.push(("YOUTUBE_API_KEY", self.youtube_api_key.as_str()));
                self.push_llm_requirements(&mut required);
                if email {
                    self.push_email_requirements(&mut required);
                }
            }
            Task::Daily => {
                required.push(("YOUTUBE_API_KEY", self.youtube_api_key.as_str()));
                self.push_llm_requirements(&mut required);
                self.push_email_requirements(&mut required);
            }
            Task::Serve => {
                required.push(("YOUTUBE_API_KEY", self.youtube_api_key.as_str()));
                self.push_llm_requirements(&mut required);
                required.push(("LINE_CHANNEL_ACCESS_TOKEN", self.line_channel_access_token.as_str()));
            }
        }

        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// 检查必需环境变量，缺失时返回包含完整列表的错误
    pub fn ensure_ready(&self, task: Task) -> AppResult<()> {
        let missing = self.missing_for(task);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingVars(missing).into())
        }
    }

    fn push_llm_requirements<'a>(&'a self, required: &mut Vec<(&'static str, &'a str)>) {
        match self.llm_provider {
            LlmProvider::Gemini => required.push(("GEMINI_API_KEY", self.gemini_api_key.as_str())),
            LlmProvider::Ollama => required.push(("OLLAMA_BASE_URL", self.ollama_base_url.as_str())),
        }
    }

    fn push_email_requirements<'a>(&'a self, required: &mut Vec<(&'static str, &'a str)>) {
        required.push(("SENDER_EMAIL", self.sender_email.as_str()));
        required.push(("SENDER_PASSWORD", self.sender_password.as_str()));
        required.push(("RECIPIENT_EMAIL", self.recipient_email.as_str()));
    }
}

fn parse_var<T: FromStr>(var_name: &str, value: &str, expected_type: &'static str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type,
        }
        .into()
    })
}
