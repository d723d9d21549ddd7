//! Response parsing into typed game values.
//!
//! Model output is supposed to be a bare JSON object but is not always:
//! it may sit inside a markdown code fence or carry trailing commas. Rows
//! from the remote question bank use loose types for ids and answer keys.
//! Everything is normalized here, at the boundary, so the rest of the game
//! only sees [`ClinicalCase`], [`EvaluationResult`] and [`ExamQuestion`].

use serde_json::Value;
use vetlogic_engine::check_question;
use vetlogic_engine::reward::MAX_SCORE;
use vetlogic_types::{AnswerKey, ClinicalCase, EvaluationResult, ExamQuestion, QuestionType};

use crate::error::AiError;

// ---------------------------------------------------------------------------
// JSON recovery
// ---------------------------------------------------------------------------

/// Parse model output as JSON.
///
/// Tries, in order:
/// 1. Direct parse
/// 2. The contents of a markdown code fence
/// 3. Either of the above with trailing commas removed
pub fn parse_json(raw: &str) -> Result<Value, AiError> {
    let trimmed = raw.trim();
    let fenced = extract_codeblock(trimmed);

    let candidates = [Some(trimmed), fenced];
    for text in candidates.iter().flatten() {
        if let Ok(value) = serde_json::from_str(text) {
            return Ok(value);
        }
    }
    for text in candidates.iter().flatten() {
        if let Ok(value) = serde_json::from_str(&strip_trailing_commas(text)) {
            return Ok(value);
        }
    }
    Err(AiError::Parse(format!("response is not JSON: {trimmed}")))
}

/// The body of the first ```` ```json ```` or ```` ``` ```` fence.
fn extract_codeblock(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_ticks = text.get(open.checked_add(3)?..)?;
    let body_start = after_ticks.find('\n').map_or(0, |nl| nl.saturating_add(1));
    let body = after_ticks.get(body_start..)?;
    let end = body.find("```")?;
    body.get(..end).map(str::trim)
}

/// Remove commas that directly precede `}` or `]`.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' {
            let rest: String = chars.clone().skip_while(|n| n.is_whitespace()).take(1).collect();
            if rest == "}" || rest == "]" {
                continue;
            }
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Cases and evaluations
// ---------------------------------------------------------------------------

/// Build a case from model output, assigning `id` and filling a missing
/// difficulty.
pub fn case_from_json(value: Value, id: String, difficulty: u32) -> Result<ClinicalCase, AiError> {
    let mut case: ClinicalCase = serde_json::from_value(value)
        .map_err(|e| AiError::Parse(format!("case does not match the expected shape: {e}")))?;
    case.id = id;
    if case.difficulty == 0 {
        case.difficulty = difficulty;
    }
    if case.species.is_empty() {
        return Err(AiError::Parse("case has no species".to_owned()));
    }
    Ok(case)
}

fn lenient_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn lenient_score(value: Option<&Value>) -> Option<u32> {
    let raw = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('分').parse().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    let clamped = raw.round().clamp(0.0, f64::from(MAX_SCORE));
    // Clamped to 0..=100 above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = clamped as u32;
    Some(score)
}

fn text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Build an evaluation from model output.
///
/// The score is rounded and clamped to 0..=100. A missing verdict is
/// inferred from the score (60 and above passes).
pub fn evaluation_from_json(value: &Value) -> Result<EvaluationResult, AiError> {
    let score = lenient_score(value.get("score"))
        .ok_or_else(|| AiError::Parse("evaluation has no usable score".to_owned()))?;
    let is_correct = lenient_bool(value.get("isCorrect")).unwrap_or(score >= 60);
    Ok(EvaluationResult {
        is_correct,
        score,
        feedback: text(value, "feedback"),
        correct_diagnosis: text(value, "correctDiagnosis"),
        standard_of_care: text(value, "standardOfCare"),
    })
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

fn index_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|i| u32::try_from(i).ok()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse() {
                return Some(i);
            }
            let mut chars = s.chars();
            let letter = chars.next()?.to_ascii_uppercase();
            if chars.next().is_some_and(char::is_alphanumeric) || !letter.is_ascii_uppercase() {
                return None;
            }
            u32::from(letter).checked_sub(u32::from('A'))
        }
        _ => None,
    }
}

/// Normalize a loose answer key: an index, a numeric string, an option
/// letter, or an array of those.
pub fn answer_from_value(value: &Value) -> Option<AnswerKey> {
    match value {
        Value::Array(items) => {
            let indices: Option<Vec<u32>> = items.iter().map(index_from_value).collect();
            Some(AnswerKey::multiple(indices?))
        }
        other => index_from_value(other).map(AnswerKey::Single),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|v| v.as_str().map_or_else(|| v.to_string(), ToOwned::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

fn question_type_for(declared: Option<&str>, key: &AnswerKey) -> QuestionType {
    match declared.map(str::trim) {
        Some("single") => QuestionType::Single,
        Some("multiple") => QuestionType::Multiple,
        _ => match key {
            AnswerKey::Multiple(set) if set.len() > 1 => QuestionType::Multiple,
            _ => QuestionType::Single,
        },
    }
}

fn finish(question: ExamQuestion) -> Result<ExamQuestion, AiError> {
    check_question(&question).map_err(|e| AiError::Parse(e.to_string()))?;
    Ok(question)
}

/// Convert a question bank row.
///
/// Ids may be numbers or strings; an unrecognised `question_type` is
/// inferred from the shape of the key.
pub fn question_from_row(row: &Value) -> Result<ExamQuestion, AiError> {
    let id = match row.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(AiError::Parse("question row has no id".to_owned())),
    };
    let correct_answer = row
        .get("correct_answer")
        .and_then(answer_from_value)
        .ok_or_else(|| AiError::Parse(format!("question {id} has no usable answer key")))?;
    let question_type = question_type_for(
        row.get("question_type").and_then(Value::as_str),
        &correct_answer,
    );
    let exam_year = row
        .get("exam_year")
        .and_then(Value::as_u64)
        .and_then(|y| u32::try_from(y).ok());

    finish(ExamQuestion {
        stem: text(row, "stem"),
        options: string_list(row.get("options")),
        explanation: text(row, "explanation"),
        subject: text(row, "subject"),
        id,
        question_type,
        correct_answer,
        exam_year,
    })
}

/// Convert generated quiz output into questions.
///
/// Accepts `{"questions": [...]}`, a bare array, or a single question
/// object. Items use `question`, `options`, `correctAnswer` and
/// `explanation`. Malformed items are dropped with a warning.
pub fn quiz_from_json(value: &Value, id_prefix: &str, subject: &str) -> Vec<ExamQuestion> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match obj.get("questions") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![value],
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(n, item)| {
            let id = format!("{id_prefix}-{}", n.saturating_add(1));
            let parsed = item
                .get("correctAnswer")
                .and_then(answer_from_value)
                .ok_or_else(|| AiError::Parse(format!("question {id} has no usable answer key")))
                .and_then(|correct_answer| {
                    finish(ExamQuestion {
                        question_type: question_type_for(None, &correct_answer),
                        stem: text(item, "question"),
                        options: string_list(item.get("options")),
                        explanation: text(item, "explanation"),
                        subject: subject.to_owned(),
                        exam_year: None,
                        id: id.clone(),
                        correct_answer,
                    })
                });
            match parsed {
                Ok(question) => Some(question),
                Err(e) => {
                    tracing::warn!(question = %id, error = %e, "dropping generated question");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn json_recovery_strategies() {
        assert_eq!(parse_json(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(
            parse_json("```json\n{\"a\": 1}\n```").unwrap(),
            json!({"a": 1})
        );
        assert_eq!(parse_json("```\n{\"a\": [1, 2,],}\n```").unwrap(), json!({"a": [1, 2]}));
        assert!(matches!(parse_json("not json"), Err(AiError::Parse(_))));
    }

    #[test]
    fn trailing_commas_only_before_closers() {
        assert_eq!(strip_trailing_commas(r#"{"a": 1, "b": 2,}"#), r#"{"a": 1, "b": 2}"#);
        assert_eq!(strip_trailing_commas("[1, 2, 3,\n]"), "[1, 2, 3\n]");
        assert_eq!(strip_trailing_commas("[1, 2]"), "[1, 2]");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn case_gets_id_and_difficulty() {
        let value = json!({
            "species": "犬",
            "breed": "柯基",
            "weightKg": 12.5,
            "chiefComplaint": "呕吐",
            "tpr": {"temp": 39.5, "hr": 120, "rr": 30, "mm": "粉红", "crt": "<2s"}
        });
        let case = case_from_json(value, "1700000000000".to_owned(), 2).unwrap();
        assert_eq!(case.id, "1700000000000");
        assert_eq!(case.difficulty, 2);
        assert!((case.weight_kg - 12.5).abs() < f64::EPSILON);
        assert!(case_from_json(json!({"breed": "x"}), "1".to_owned(), 1).is_err());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn evaluation_normalizes_score() {
        let eval = evaluation_from_json(&json!({
            "isCorrect": true,
            "score": 87.6,
            "feedback": "好",
            "correctDiagnosis": "细小",
            "standardOfCare": "补液"
        }))
        .unwrap();
        assert_eq!(eval.score, 88);
        assert!(eval.is_correct);

        let eval = evaluation_from_json(&json!({"score": "130分"})).unwrap();
        assert_eq!(eval.score, 100);
        assert!(eval.is_correct);

        let eval = evaluation_from_json(&json!({"score": -5, "isCorrect": "false"})).unwrap();
        assert_eq!(eval.score, 0);
        assert!(!eval.is_correct);

        assert!(evaluation_from_json(&json!({"feedback": "?"})).is_err());
    }

    #[test]
    fn loose_answer_keys() {
        assert_eq!(answer_from_value(&json!(2)), Some(AnswerKey::Single(2)));
        assert_eq!(answer_from_value(&json!("1")), Some(AnswerKey::Single(1)));
        assert_eq!(answer_from_value(&json!("C")), Some(AnswerKey::Single(2)));
        assert_eq!(
            answer_from_value(&json!([3, 1, 1])),
            Some(AnswerKey::multiple([1, 3]))
        );
        assert_eq!(answer_from_value(&json!(-1)), None);
        assert_eq!(answer_from_value(&json!("Ab")), None);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn bank_rows_normalized() {
        let row = json!({
            "id": 42,
            "question_type": "A1",
            "stem": "下列属于人畜共患病的是",
            "options": ["狂犬病", "布鲁氏菌病", "结核病", "犬瘟热"],
            "correct_answer": [0, 1, 2],
            "explanation": "",
            "subject": "预防",
            "difficulty": 3,
            "is_shared_stem": false,
            "exam_year": 2021
        });
        let q = question_from_row(&row).unwrap();
        assert_eq!(q.id, "42");
        assert_eq!(q.question_type, QuestionType::Multiple);
        assert_eq!(q.exam_year, Some(2021));

        let bad = json!({"id": "x", "options": ["A"], "correct_answer": 4});
        assert!(question_from_row(&bad).is_err());
    }

    #[test]
    fn quiz_shapes() {
        let one = json!({
            "question": "猫的正常体温？",
            "options": ["A", "B", "C", "D"],
            "correctAnswer": 2,
            "explanation": "38-39.5"
        });
        let wrapped = json!({"questions": [one.clone(), {"question": "坏题", "options": [], "correctAnswer": 0}]});

        let single = quiz_from_json(&one, "qual", "资格");
        assert_eq!(single.len(), 1);
        assert_eq!(single.first().map(|q| q.id.as_str()), Some("qual-1"));

        let many = quiz_from_json(&wrapped, "qual", "资格");
        assert_eq!(many.len(), 1);
        assert!(quiz_from_json(&json!("text"), "qual", "资格").is_empty());
    }
}
