use serde::{Deserialize, Serialize};

/// 一个 TOEIC 单字
///
/// 不同模型返回的字段名不一致（Gemini 用 `chinese` / `example`，
/// Ollama 用 `definition` / `example_sentence`），反序列化时统一收敛，
/// 同时出现多个写法时取第一个非空值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawVocabEntry")]
pub struct VocabEntry {
    pub word: String,
    pub translation: String,
    pub part_of_speech: String,
    pub example: String,
}

/// 模型原始返回的单字，每种字段写法各自保留
#[derive(Deserialize)]
struct RawVocabEntry {
    #[serde(default)]
    word: String,
    #[serde(default)]
    translation: Option<String>,
    #[serde(default)]
    chinese: Option<String>,
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    part_of_speech: String,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    example_sentence: Option<String>,
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default()
}

impl From<RawVocabEntry> for VocabEntry {
    fn from(raw: RawVocabEntry) -> Self {
        Self {
            word: raw.word,
            translation: first_non_empty([raw.translation, raw.chinese, raw.definition]),
            part_of_speech: raw.part_of_speech,
            example: first_non_empty([raw.example, raw.example_sentence]),
        }
    }
}

/// 四个选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOptions {
    #[serde(rename = "A", default)]
    pub a: String,
    #[serde(rename = "B", default)]
    pub b: String,
    #[serde(rename = "C", default)]
    pub c: String,
    #[serde(rename = "D", default)]
    pub d: String,
}

impl QuizOptions {
    /// 按 A-D 顺序返回 (标签, 内容)
    pub fn labeled(&self) -> [(&'static str, &str); 4] {
        [
            ("A", self.a.as_str()),
            ("B", self.b.as_str()),
            ("C", self.c.as_str()),
            ("D", self.d.as_str()),
        ]
    }
}

/// 一道选择题
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: QuizOptions,
    /// 正确选项的标签（A-D）
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}
