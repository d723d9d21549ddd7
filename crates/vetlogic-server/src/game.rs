//! Game action handlers.
//!
//! These endpoints drive the player's [`GameSession`](vetlogic_core::GameSession):
//! every call reads or mutates the persisted save, and energy keeps
//! regenerating in the background between calls.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/game/state` | Save, promotion status and rank progress |
//! | `GET` | `/api/game/talents` | Talent tree with unlockable flags |
//! | `POST` | `/api/game/case/start` | Spend energy on a new case |
//! | `POST` | `/api/game/case/submit` | Grade the active case |
//! | `POST` | `/api/game/exam/start` | Spend energy on an exam |
//! | `POST` | `/api/game/exam/answer` | Grade one exam answer |
//! | `POST` | `/api/game/exam/finish` | Close the exam and pay out |
//! | `POST` | `/api/game/qualification/start` | Start the promotion exam |
//! | `POST` | `/api/game/qualification/submit` | Grade it and maybe promote |
//! | `POST` | `/api/game/equipment/buy` | Buy equipment |
//! | `POST` | `/api/game/talents/unlock` | Unlock a talent |
//! | `POST` | `/api/game/reset` | Start over |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vetlogic_ai::parse::answer_from_value;
use vetlogic_core::collab::{CaseGenerator, QuestionBank};
use vetlogic_core::{AnswerFeedback, CaseOutcome, ExamOutcome, QualificationOutcome};
use vetlogic_engine::{PromotionStatus, can_unlock};
use vetlogic_store::SaveStorage;
use vetlogic_types::{ClinicalCase, ExamQuestion, GameState, TalentNode};

use crate::error::ServerError;
use crate::handlers::{DEFAULT_QUESTION_COUNT, MAX_QUESTION_COUNT};
use crate::state::AppState;

type Shared<S, G, Q> = State<Arc<AppState<S, G, Q>>>;
type Body<T> = Result<Json<T>, JsonRejection>;

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Response of `GET /api/game/state`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// The persisted save.
    pub state: GameState,
    /// Where the player stands relative to the next rank.
    pub promotion: PromotionStatus,
    /// Progress toward the next rank, 0 to 100.
    pub rank_progress: u64,
    /// Whether a collaborator call is in flight.
    pub busy: bool,
}

/// One entry of `GET /api/game/talents`.
#[derive(Debug, Clone, Serialize)]
pub struct TalentView {
    /// The node as saved.
    #[serde(flatten)]
    pub node: TalentNode,
    /// Whether the player could unlock it right now.
    pub unlockable: bool,
}

/// Body of `POST /api/game/case/submit`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitCaseRequest {
    /// The player's diagnosis.
    pub diagnosis: Option<String>,
    /// The player's treatment plan.
    pub plan: Option<String>,
}

/// Body of `POST /api/game/exam/start`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StartExamRequest {
    /// Number of questions (default 10, at most 50).
    pub count: Option<usize>,
    /// Restrict to one subject.
    pub subject: Option<String>,
}

/// Body of `POST /api/game/exam/answer`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExamAnswerRequest {
    /// Position of the question in the active exam.
    pub index: Option<usize>,
    /// An index, a letter, or an array of those.
    pub answer: Option<Value>,
    /// Seconds spent on the question.
    pub time_spent: Option<u32>,
}

/// Body of `POST /api/game/qualification/submit`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QualificationSubmitRequest {
    /// One answer per question; `null` for a skipped question.
    pub answers: Vec<Value>,
}

/// Body of the equipment and talent endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ItemRequest {
    /// Equipment or talent id.
    pub id: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, ServerError> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::missing(field))
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// The current save with derived progress.
pub async fn state<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
) -> Json<GameView> {
    let session = &app.session;
    Json(GameView {
        state: session.snapshot().await,
        promotion: session.promotion_status().await,
        rank_progress: session.rank_progress().await,
        busy: session.is_busy(),
    })
}

/// The talent tree in display order.
pub async fn talents<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
) -> Json<Vec<TalentView>> {
    let state = app.session.snapshot().await;
    let views = state
        .talents
        .iter()
        .map(|node| TalentView {
            node: node.clone(),
            unlockable: can_unlock(node, &state.talents, state.skill_points),
        })
        .collect();
    Json(views)
}

// ---------------------------------------------------------------------------
// Clinical cases
// ---------------------------------------------------------------------------

/// Start a case at the player's rank.
pub async fn start_case<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
) -> Result<Json<ClinicalCase>, ServerError> {
    Ok(Json(app.session.start_case().await?))
}

/// Grade the active case.
pub async fn submit_case<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
    payload: Body<SubmitCaseRequest>,
) -> Result<Json<CaseOutcome>, ServerError> {
    let Json(body) = payload?;
    let diagnosis = required(body.diagnosis, "diagnosis, plan")?;
    let plan = required(body.plan, "diagnosis, plan")?;
    Ok(Json(app.session.submit_case(&diagnosis, &plan).await?))
}

// ---------------------------------------------------------------------------
// Exams
// ---------------------------------------------------------------------------

/// Start an exam.
pub async fn start_exam<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
    payload: Body<StartExamRequest>,
) -> Result<Json<Vec<ExamQuestion>>, ServerError> {
    let Json(body) = payload?;
    let count = body
        .count
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .min(MAX_QUESTION_COUNT);
    let subject = body.subject.filter(|s| !s.trim().is_empty());
    Ok(Json(app.session.start_exam(count, subject.as_deref()).await?))
}

/// Grade one answer of the active exam.
pub async fn answer_question<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
    payload: Body<ExamAnswerRequest>,
) -> Result<Json<AnswerFeedback>, ServerError> {
    let Json(body) = payload?;
    let (Some(index), Some(answer)) = (
        body.index,
        body.answer.as_ref().and_then(answer_from_value),
    ) else {
        return Err(ServerError::missing("index, answer"));
    };
    let feedback = app
        .session
        .answer_question(index, answer, body.time_spent.unwrap_or(0))
        .await?;
    Ok(Json(feedback))
}

/// Close the active exam.
pub async fn finish_exam<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
) -> Result<Json<ExamOutcome>, ServerError> {
    Ok(Json(app.session.finish_exam().await?))
}

// ---------------------------------------------------------------------------
// Qualification
// ---------------------------------------------------------------------------

/// Start the qualification exam for the next rank.
pub async fn start_qualification<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
) -> Result<Json<Vec<ExamQuestion>>, ServerError> {
    Ok(Json(app.session.start_qualification().await?))
}

/// Grade the qualification exam.
pub async fn submit_qualification<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
    payload: Body<QualificationSubmitRequest>,
) -> Result<Json<QualificationOutcome>, ServerError> {
    let Json(body) = payload?;
    let answers: Vec<_> = body.answers.iter().map(answer_from_value).collect();
    Ok(Json(app.session.submit_qualification(&answers).await?))
}

// ---------------------------------------------------------------------------
// Clinic
// ---------------------------------------------------------------------------

/// Buy a piece of equipment.
pub async fn buy_equipment<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
    payload: Body<ItemRequest>,
) -> Result<Json<GameState>, ServerError> {
    let Json(body) = payload?;
    let id = required(body.id, "id")?;
    Ok(Json(app.session.buy_equipment(&id).await?))
}

/// Unlock a talent.
pub async fn unlock_talent<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
    payload: Body<ItemRequest>,
) -> Result<Json<GameState>, ServerError> {
    let Json(body) = payload?;
    let id = required(body.id, "id")?;
    Ok(Json(app.session.unlock_talent(&id).await?))
}

/// Abandon everything and start a fresh game.
pub async fn reset<S: SaveStorage, G: CaseGenerator, Q: QuestionBank>(
    State(app): Shared<S, G, Q>,
) -> Json<GameState> {
    tracing::info!("game reset requested");
    Json(app.session.reset().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required(Some(" 细小 ".to_owned()), "x").ok(), Some("细小".to_owned()));
        assert!(required(Some("   ".to_owned()), "x").is_err());
        assert!(required(None, "x").is_err());
    }
}
