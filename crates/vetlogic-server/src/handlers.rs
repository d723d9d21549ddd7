//! REST endpoint handlers for the proxy server.
//!
//! Every handler is a thin shim over a collaborator held by the session
//! in [`AppState`]. These endpoints are stateless: they never touch the
//! player's save. The stateful game actions live in [`crate::game`].
//! Request bodies are camelCase JSON; missing fields are answered with a
//! 400 before any collaborator is called.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Service name and endpoint listing |
//! | `GET` | `/api/health` | Liveness check |
//! | `POST` | `/api/cases/generate` | Generate a case for a rank |
//! | `POST` | `/api/cases/evaluate` | Grade a diagnosis and plan |
//! | `POST` | `/api/exam/questions` | Draw random exam questions |
//! | `POST` | `/api/exam/submit-answer` | Check and record one answer |
//! | `POST` | `/api/quiz/qualification` | Generate a promotion exam |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vetlogic_ai::parse::answer_from_value;
use vetlogic_core::collab::{CaseGenerator, QuestionBank};
use vetlogic_engine::answer::validate;
use vetlogic_store::SaveStorage;
use vetlogic_types::{
    AnswerKey, AnswerRecord, ClinicalCase, EvaluationResult, ExamQuestion, Rank,
};

use crate::error::ServerError;
use crate::state::AppState;

/// Questions drawn when the request does not say.
pub const DEFAULT_QUESTION_COUNT: usize = 10;

/// Questions in a generated qualification exam when the request does not
/// say.
pub const DEFAULT_QUALIFICATION_COUNT: usize = 5;

/// Upper bound on the questions one request may ask for.
pub const MAX_QUESTION_COUNT: usize = 50;

type Body<T> = Result<Json<T>, JsonRejection>;

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/cases/generate`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateCaseRequest {
    /// Rank to generate for, as a code (`INTERN`) or label (`实习医生`).
    pub rank: Option<Rank>,
}

/// Body of `POST /api/cases/evaluate`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluateRequest {
    /// The case being answered.
    pub clinical_case: Option<ClinicalCase>,
    /// The player's diagnosis.
    pub diagnosis: Option<String>,
    /// The player's treatment plan.
    pub plan: Option<String>,
}

/// Body of `POST /api/exam/questions`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuestionsRequest {
    /// Number of questions (default 10, at most 50).
    pub count: Option<usize>,
    /// Restrict to one subject.
    pub subject: Option<String>,
}

/// Body of `POST /api/exam/submit-answer`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    /// Player identifier.
    pub user_id: Option<String>,
    /// Question identifier, a string or a number.
    pub question_id: Option<Value>,
    /// An index, a letter, or an array of those.
    pub user_answer: Option<Value>,
    /// Seconds spent on the question.
    pub time_spent: Option<u32>,
}

/// Response of `POST /api/exam/submit-answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    /// Whether the answer was right.
    pub is_correct: bool,
    /// The question's explanation.
    pub explanation: String,
    /// The correct key.
    pub correct_answer: AnswerKey,
}

/// Body of `POST /api/quiz/qualification`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualificationRequest {
    /// The rank the exam promotes into.
    pub target_rank: Option<Rank>,
    /// Number of questions (default 5, at most 50).
    pub count: Option<usize>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn question_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// GET / and GET /api/health
// ---------------------------------------------------------------------------

/// Service name and the endpoint list.
pub async fn index() -> Json<Value> {
    Json(serde_json::json!({
        "name": "智能兽医大亨 API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /api/health",
            "generateCase": "POST /api/cases/generate",
            "evaluateCase": "POST /api/cases/evaluate",
            "examQuestions": "POST /api/exam/questions",
            "submitAnswer": "POST /api/exam/submit-answer",
            "qualificationQuiz": "POST /api/quiz/qualification",
            "game": "GET /api/game/state",
        },
    }))
}

/// Liveness check.
pub async fn health<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(state): State<Arc<AppState<S, G, Q>>>,
) -> Json<Value> {
    Json(serde_json::json!({
        "status": "OK",
        "message": "兽医大亨后端服务运行中",
        "timestamp": Utc::now().to_rfc3339(),
        "startedAt": state.started_at.to_rfc3339(),
    }))
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

/// Generate a clinical case for `rank`.
pub async fn generate_case<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(state): State<Arc<AppState<S, G, Q>>>,
    payload: Body<GenerateCaseRequest>,
) -> Result<Json<ClinicalCase>, ServerError> {
    let Json(body) = payload?;
    let rank = body.rank.ok_or_else(|| ServerError::missing("rank"))?;

    tracing::info!(rank = %rank, "generating case");
    let case = state
        .generator()
        .generate_case(rank)
        .await
        .map_err(|e| ServerError::collaborator("病例生成失败", e))?;
    tracing::info!(id = %case.id, "case generated");
    Ok(Json(case))
}

/// Grade a diagnosis and plan against a case.
pub async fn evaluate_case<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(state): State<Arc<AppState<S, G, Q>>>,
    payload: Body<EvaluateRequest>,
) -> Result<Json<EvaluationResult>, ServerError> {
    let Json(body) = payload?;
    let (Some(case), Some(diagnosis), Some(plan)) = (
        body.clinical_case,
        non_empty(body.diagnosis),
        non_empty(body.plan),
    ) else {
        return Err(ServerError::missing("clinicalCase, diagnosis, plan"));
    };

    tracing::info!(case = %case.id, "evaluating case");
    let evaluation = state
        .generator()
        .evaluate(&case, &diagnosis, &plan)
        .await
        .map_err(|e| ServerError::collaborator("评估失败", e))?;
    tracing::info!(score = evaluation.score, "evaluation complete");
    Ok(Json(evaluation))
}

// ---------------------------------------------------------------------------
// Exam
// ---------------------------------------------------------------------------

/// Draw random exam questions.
pub async fn exam_questions<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(state): State<Arc<AppState<S, G, Q>>>,
    payload: Body<QuestionsRequest>,
) -> Result<Json<Vec<ExamQuestion>>, ServerError> {
    let Json(body) = payload?;
    let count = body
        .count
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .min(MAX_QUESTION_COUNT);
    let subject = non_empty(body.subject);

    tracing::info!(count, subject = subject.as_deref().unwrap_or("all"), "drawing questions");
    let questions = state
        .bank()
        .random_questions(count, subject.as_deref())
        .await
        .map_err(|e| ServerError::collaborator("获取题目失败", e))?;
    tracing::info!(drawn = questions.len(), "questions drawn");
    Ok(Json(questions))
}

/// Check one answer and record it.
///
/// Recording is best-effort: a failed insert is logged and the verdict is
/// still returned.
pub async fn submit_answer<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(state): State<Arc<AppState<S, G, Q>>>,
    payload: Body<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, ServerError> {
    let Json(body) = payload?;
    let (Some(user_id), Some(question_id), Some(user_answer)) = (
        non_empty(body.user_id),
        question_id(body.question_id.as_ref()),
        body.user_answer.as_ref().and_then(answer_from_value),
    ) else {
        return Err(ServerError::missing("userId, questionId, userAnswer"));
    };

    let question = state
        .bank()
        .question_by_id(&question_id)
        .await
        .map_err(|e| ServerError::collaborator("提交答案失败", e))?
        .ok_or_else(|| ServerError::NotFound("题目不存在".to_owned()))?;

    let is_correct = validate(&question.correct_answer, &user_answer);
    let record = AnswerRecord {
        user_id,
        question_id,
        user_answer,
        is_correct,
        time_spent: body.time_spent.unwrap_or(0),
    };
    if let Err(e) = state.bank().record_answer(&record).await {
        tracing::warn!(
            user = %record.user_id,
            question = %record.question_id,
            error = %e,
            "failed to record answer"
        );
    }

    tracing::info!(question = %record.question_id, correct = is_correct, "answer checked");
    Ok(Json(SubmitAnswerResponse {
        is_correct,
        explanation: question.explanation,
        correct_answer: question.correct_answer,
    }))
}

/// Generate a qualification exam for `targetRank`.
pub async fn qualification_quiz<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(state): State<Arc<AppState<S, G, Q>>>,
    payload: Body<QualificationRequest>,
) -> Result<Json<Vec<ExamQuestion>>, ServerError> {
    let Json(body) = payload?;
    let target = body
        .target_rank
        .ok_or_else(|| ServerError::missing("targetRank"))?;
    let count = body
        .count
        .unwrap_or(DEFAULT_QUALIFICATION_COUNT)
        .min(MAX_QUESTION_COUNT);

    let questions = state
        .generator()
        .qualification_exam(target, count)
        .await
        .map_err(|e| ServerError::collaborator("资格考试生成失败", e))?;
    tracing::info!(to = %target, questions = questions.len(), "qualification exam generated");
    Ok(Json(questions))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn question_ids_accept_numbers_and_strings() {
        assert_eq!(question_id(Some(&json!(42))), Some("42".to_owned()));
        assert_eq!(question_id(Some(&json!(" q1 "))), Some("q1".to_owned()));
        assert_eq!(question_id(Some(&json!(""))), None);
        assert_eq!(question_id(Some(&json!(null))), None);
        assert_eq!(question_id(None), None);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn request_bodies_are_camel_case() {
        let body: SubmitAnswerRequest = serde_json::from_value(json!({
            "userId": "u1",
            "questionId": "q6",
            "userAnswer": [0, 2],
            "timeSpent": 12
        }))
        .unwrap();
        assert_eq!(body.user_id.as_deref(), Some("u1"));
        assert_eq!(body.time_spent, Some(12));

        let body: GenerateCaseRequest = serde_json::from_value(json!({"rank": "住院医师"})).unwrap();
        assert_eq!(body.rank, Some(Rank::Resident));

        let body: QuestionsRequest = serde_json::from_value(json!({})).unwrap();
        assert!(body.count.is_none());
    }
}
