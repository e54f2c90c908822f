use crate::error::Result;
use crate::images::ImageStore;
use crate::record::{
    AnswerRecord, Explanation, QuestionRecord, TestRecord, DEFAULT_DURATION,
    DEFAULT_MAX_WRONG_ANSWERS,
};
use serde::Deserialize;
use serde_json::Value;

/// Upstream `userExamTest` payload.
#[derive(Debug, Default, Deserialize)]
struct RawUserExamTest {
    exam_test: Option<RawExamTest>,
}

#[derive(Debug, Default, Deserialize)]
struct RawExamTest {
    id: Option<Value>,
    duration: Option<Value>,
    max_wrong_answers: Option<Value>,
    questions: Option<Vec<RawQuestion>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawQuestion {
    id: Option<Value>,
    image: Option<Value>,
    translation: Option<Value>,
    answers: Option<Vec<RawAnswer>>,
    explanation: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAnswer {
    id: Option<Value>,
    translation: Option<Value>,
    is_right: Option<Value>,
}

/// Text of a translation block field, empty when missing or not a string.
fn translated(translation: Option<&Value>, key: &str) -> String {
    translation
        .and_then(|t| t.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Upstream flags arrive as booleans, 0/1 or strings.
fn truthy(value: &Option<Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "True"),
        _ => false,
    }
}

fn integer_or(value: &Option<Value>, default: i64) -> i64 {
    value.as_ref().and_then(Value::as_i64).unwrap_or(default)
}

/// Maps raw payloads into [`TestRecord`]s, downloading images on the way.
#[derive(Debug, Clone)]
pub struct Normalizer {
    images: ImageStore,
    label_prefix: String,
}

impl Normalizer {
    /// A new normalizer.
    pub fn new(images: ImageStore, label_prefix: &str) -> Self {
        Self {
            images,
            label_prefix: label_prefix.to_string(),
        }
    }

    /// Build the record of a test from its `userExamTest` payload.
    ///
    /// Questions are numbered by position. Missing duration and max wrong
    /// answers fall back to their defaults. Image failures leave
    /// `image_local_path` empty and never fail the record.
    pub async fn normalize(&self, raw: &Value, test_number: u32) -> Result<TestRecord> {
        let raw: RawUserExamTest = serde_json::from_value(raw.clone())?;
        let exam_test = raw.exam_test.unwrap_or_default();

        let mut record = TestRecord {
            test_number,
            test_id: exam_test.id,
            title: format!("{} {}", self.label_prefix, test_number),
            duration_minutes: integer_or(&exam_test.duration, DEFAULT_DURATION),
            max_wrong_answers: integer_or(&exam_test.max_wrong_answers, DEFAULT_MAX_WRONG_ANSWERS),
            questions: Vec::new(),
        };

        for (idx, question) in exam_test.questions.unwrap_or_default().into_iter().enumerate() {
            let question_number = idx + 1;
            log::info!("  Processing question {}...", question_number);
            record
                .questions
                .push(self.question(question, question_number, test_number).await);
        }

        Ok(record)
    }

    async fn question(
        &self,
        question: RawQuestion,
        question_number: usize,
        test_number: u32,
    ) -> QuestionRecord {
        let image_reference = question
            .image
            .as_ref()
            .and_then(Value::as_str)
            .map(String::from);

        let image_local_path = match image_reference.as_deref() {
            Some(name) if !name.is_empty() => self
                .images
                .download(name, test_number)
                .await
                .map(|path| path.to_string_lossy().into_owned()),
            _ => None,
        };

        let answers = question
            .answers
            .unwrap_or_default()
            .into_iter()
            .map(|answer| AnswerRecord {
                answer_id: answer.id,
                text: translated(answer.translation.as_ref(), "title"),
                is_correct: truthy(&answer.is_right),
            })
            .collect();

        // Only a non-empty translation object counts, any other shape is no explanation.
        let explanation = question
            .explanation
            .as_ref()
            .and_then(|e| e.get("translation"))
            .filter(|t| t.as_object().is_some_and(|t| !t.is_empty()))
            .map(|t| Explanation {
                title: translated(Some(t), "title"),
                description: translated(Some(t), "description"),
            });

        QuestionRecord {
            question_number,
            question_id: question.id,
            text: translated(question.translation.as_ref(), "title"),
            image_reference,
            image_local_path,
            answers,
            explanation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_payload, CountingFetch};
    use serde_json::json;
    use std::sync::Arc;

    fn normalizer(dir: &std::path::Path, fetch: Arc<CountingFetch>) -> Normalizer {
        Normalizer::new(ImageStore::new(dir, "https://img.test/", fetch), "Թեստ")
    }

    #[tokio::test]
    async fn test_normalize_sample() {
        let dir = tempfile::tempdir().unwrap();
        let fetch = Arc::new(CountingFetch::default());
        let record = normalizer(dir.path(), fetch.clone())
            .normalize(&sample_payload(), 12)
            .await
            .unwrap();

        assert_eq!(record.test_number, 12);
        assert_eq!(record.title, "Թեստ 12");
        assert_eq!(record.test_id, Some(json!(411)));
        assert_eq!(record.duration_minutes, 20);
        assert_eq!(record.max_wrong_answers, DEFAULT_MAX_WRONG_ANSWERS);
        assert_eq!(record.questions.len(), 2);

        let first = &record.questions[0];
        assert_eq!(first.question_number, 1);
        assert_eq!(first.image_reference.as_deref(), Some("sign.png"));
        assert!(first.image_local_path.as_deref().unwrap().ends_with("sign.png"));
        assert_eq!(first.answers.iter().filter(|a| a.is_correct).count(), 1);
        assert_eq!(
            first.explanation,
            Some(Explanation {
                title: "Բացատրություն".into(),
                description: "Կանոն 12".into(),
            })
        );

        // Numbered by position even though upstream ids skip.
        let second = &record.questions[1];
        assert_eq!(second.question_number, 2);
        assert_eq!(second.image_local_path, None);
        assert_eq!(second.explanation, None);
        assert!(second.answers.iter().all(|a| a.is_correct));
        assert_eq!(fetch.requests(), 1);
    }

    #[tokio::test]
    async fn test_normalize_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = normalizer(dir.path(), Arc::new(CountingFetch::default()));
        let first = normalizer.normalize(&sample_payload(), 5).await.unwrap();
        let second = normalizer.normalize(&sample_payload(), 5).await.unwrap();
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[tokio::test]
    async fn test_normalize_defaults_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let fetch = Arc::new(CountingFetch {
            status: Some(500),
            ..Default::default()
        });
        let raw = json!({
            "exam_test": {
                "duration": null,
                "questions": [{ "image": "broken.png", "answers": [{ "is_right": false }] }]
            }
        });
        let record = normalizer(dir.path(), fetch)
            .normalize(&raw, 1)
            .await
            .unwrap();

        assert_eq!(record.test_id, None);
        assert_eq!(record.duration_minutes, DEFAULT_DURATION);
        let question = &record.questions[0];
        assert_eq!(question.text, "");
        assert_eq!(question.image_reference.as_deref(), Some("broken.png"));
        assert_eq!(question.image_local_path, None);
        assert!(!question.answers[0].is_correct);
    }

    #[tokio::test]
    async fn test_normalize_empty_payload() {
        let dir = tempfile::tempdir().unwrap();
        let record = normalizer(dir.path(), Arc::new(CountingFetch::default()))
            .normalize(&json!({}), 2)
            .await
            .unwrap();
        assert!(record.questions.is_empty());
        assert_eq!(record.duration_minutes, DEFAULT_DURATION);
    }

    #[tokio::test]
    async fn test_odd_explanation_shapes_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = normalizer(dir.path(), Arc::new(CountingFetch::default()));
        let raw = json!({
            "exam_test": {
                "questions": [
                    { "translation": { "title": "Ա" }, "explanation": [] },
                    { "translation": { "title": "Բ" }, "explanation": null },
                    { "translation": { "title": "Գ" }, "explanation": { "translation": [] } },
                    { "translation": [], "explanation": "text" }
                ]
            }
        });

        let record = normalizer.normalize(&raw, 6).await.unwrap();

        assert_eq!(record.questions.len(), 4);
        assert!(record.questions.iter().all(|q| q.explanation.is_none()));
        assert_eq!(record.questions[2].text, "Գ");
        assert_eq!(record.questions[3].text, "");
    }

    #[test]
    fn test_truthy() {
        assert!(truthy(&Some(json!(true))));
        assert!(truthy(&Some(json!(1))));
        assert!(truthy(&Some(json!("1"))));
        assert!(!truthy(&Some(json!(0))));
        assert!(!truthy(&None));
    }
}
