//! Exam question records and answer shapes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::QuestionType;

/// An answer, either one option index or a set of option indices.
///
/// Used both for a question's answer key and for a submission. On the wire
/// it is a bare integer or an integer array; duplicates in an array
/// collapse on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum AnswerKey {
    /// A single option index.
    Single(u32),
    /// A set of option indices.
    Multiple(BTreeSet<u32>),
}

impl AnswerKey {
    /// Build a set answer from any index sequence, collapsing duplicates.
    pub fn multiple(indices: impl IntoIterator<Item = u32>) -> Self {
        Self::Multiple(indices.into_iter().collect())
    }

    /// The indices named by this answer.
    pub fn indices(&self) -> BTreeSet<u32> {
        match self {
            Self::Single(index) => BTreeSet::from([*index]),
            Self::Multiple(set) => set.clone(),
        }
    }
}

/// A multiple-choice exam question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExamQuestion {
    /// Question identifier.
    pub id: String,
    /// Single or multiple answer.
    pub question_type: QuestionType,
    /// Question text.
    pub stem: String,
    /// Option texts, indexed from zero.
    pub options: Vec<String>,
    /// Answer key.
    pub correct_answer: AnswerKey,
    /// Explanation shown after answering.
    #[serde(default)]
    pub explanation: String,
    /// Subject area, e.g. 基础 or 临床.
    #[serde(default)]
    pub subject: String,
    /// Year of the licensing exam the question comes from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_year: Option<u32>,
}

/// A player's answer to a bank question, as recorded remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AnswerRecord {
    /// Player identifier.
    pub user_id: String,
    /// Question identifier.
    pub question_id: String,
    /// Submitted answer.
    pub user_answer: AnswerKey,
    /// Grading outcome.
    pub is_correct: bool,
    /// Seconds spent on the question.
    pub time_spent: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn answer_key_from_integer_or_array() {
        let single: AnswerKey = serde_json::from_str("2").unwrap();
        assert_eq!(single, AnswerKey::Single(2));

        let multi: AnswerKey = serde_json::from_str("[3, 1, 0, 1]").unwrap();
        assert_eq!(multi, AnswerKey::multiple([0, 1, 3]));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn question_record_shape() {
        let q: ExamQuestion = serde_json::from_str(
            r#"{"id":"q6","question_type":"multiple","stem":"s","options":["a","b"],
                "correct_answer":[0,1],"explanation":"e","subject":"预防","exam_year":2023}"#,
        )
        .unwrap();
        assert_eq!(q.question_type, QuestionType::Multiple);
        assert_eq!(q.exam_year, Some(2023));
        assert_eq!(q.correct_answer.indices().len(), 2);
    }
}
