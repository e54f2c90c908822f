use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default exam duration in minutes.
pub const DEFAULT_DURATION: i64 = 30;
/// Default number of wrong answers allowed.
pub const DEFAULT_MAX_WRONG_ANSWERS: i64 = 2;

/// One practice test as persisted in `test_<n>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Position of the test in the catalog, 1 based.
    pub test_number: u32,
    /// Upstream identifier.
    pub test_id: Option<Value>,
    /// Localized display title.
    pub title: String,
    /// Time limit in minutes.
    #[serde(rename = "duration")]
    pub duration_minutes: i64,
    /// Wrong answers tolerated before failing.
    pub max_wrong_answers: i64,
    /// Questions in upstream order.
    pub questions: Vec<QuestionRecord>,
}

/// A question of a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Position within the test, 1 based.
    pub question_number: usize,
    /// Upstream identifier.
    pub question_id: Option<Value>,
    /// Question text.
    #[serde(rename = "question_text")]
    pub text: String,
    /// Upstream image filename.
    #[serde(rename = "image")]
    pub image_reference: Option<String>,
    /// Where the image was stored, absent when there is none or the download failed.
    pub image_local_path: Option<String>,
    /// Answers in upstream order.
    pub answers: Vec<AnswerRecord>,
    /// Explanation of the correct answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

/// A possible answer. Zero or several answers of a question may be correct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Upstream identifier.
    pub answer_id: Option<Value>,
    /// Answer text.
    #[serde(rename = "answer_text")]
    pub text: String,
    /// Whether the answer is marked right upstream.
    pub is_correct: bool,
}

/// Explanation attached to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Short title.
    pub title: String,
    /// Full text.
    pub description: String,
}

impl TestRecord {
    /// Pretty JSON, two space indented with non ASCII kept as is.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
