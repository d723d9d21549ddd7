//! Game session orchestration.
//!
//! A [`GameSession`] ties the store to the collaborators and runs each
//! player activity end to end:
//!
//! 1. **Clinical case** -- [`start_case`](GameSession::start_case) checks
//!    energy, asks the generator for a case and shows it through the
//!    owned-equipment filter; [`submit_case`](GameSession::submit_case)
//!    grades the diagnosis and folds reward, talent bonuses, milestones and
//!    history into the state.
//! 2. **Exam** -- [`start_exam`](GameSession::start_exam) draws questions,
//!    [`answer_question`](GameSession::answer_question) grades and records
//!    one answer, [`finish_exam`](GameSession::finish_exam) pays out.
//! 3. **Qualification** -- an eligible player takes a generated exam; a
//!    pass advances the rank.
//!
//! Energy is checked before a collaborator call and deducted only after it
//! succeeds. Only one collaborator call may be in flight per session; a
//! second is rejected with [`SessionError::Busy`]. The store lock is never
//! held across a collaborator call, so the energy ticker keeps running.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;
use vetlogic_engine::equipment::{purchase, reveal_case};
use vetlogic_engine::milestone::{MilestoneUpdate, record_case};
use vetlogic_engine::rank::qualification_passed;
use vetlogic_engine::reward::{apply_bonuses, apply_reward};
use vetlogic_engine::talent::unlock_talent;
use vetlogic_engine::{
    ClinicalPolicy, EngineError, ExamPolicy, GameRules, PromotionStatus, RankLadder, Reward,
    RewardPolicy, TalentBonuses, check_question, energy, grade, validate,
};
use vetlogic_store::{SaveStorage, SharedStore};
use vetlogic_types::{
    AnswerKey, AnswerRecord, CaseHistoryItem, ClinicalCase, EvaluationResult, ExamQuestion,
    GameState, Rank,
};

use crate::collab::{CaseGenerator, CollabError, QuestionBank};

/// Errors returned by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Another collaborator call is already in flight.
    #[error("another request is in progress")]
    Busy,

    /// No clinical case has been started.
    #[error("no active clinical case")]
    NoActiveCase,

    /// No exam has been started.
    #[error("no active exam")]
    NoActiveExam,

    /// No qualification exam has been started.
    #[error("no active qualification exam")]
    NoActiveQualification,

    /// The collaborator returned no usable questions.
    #[error("no questions available")]
    NoQuestions,

    /// Diagnosis or plan left blank.
    #[error("diagnosis and plan must not be empty")]
    EmptySubmission,

    /// Answer index outside the current exam.
    #[error("question {index} out of range (exam has {len})")]
    QuestionIndex {
        /// Requested position.
        index: usize,
        /// Number of questions in the exam.
        len: usize,
    },

    /// A game rule rejected the action.
    #[error(transparent)]
    Rule(#[from] EngineError),

    /// A collaborator call failed.
    #[error(transparent)]
    Collaborator(#[from] CollabError),
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a submitted clinical case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOutcome {
    /// The evaluator's verdict.
    pub evaluation: EvaluationResult,
    /// Reward applied, after talent bonuses.
    pub reward: Reward,
    /// Milestones newly reached and skill points earned.
    pub milestones: MilestoneUpdate,
    /// Promotion status after the reward.
    pub promotion: PromotionStatus,
}

/// Feedback on one exam answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    /// Whether the answer matched the key.
    pub is_correct: bool,
    /// The question's explanation.
    pub explanation: String,
    /// The answer key.
    pub correct_answer: AnswerKey,
}

/// Result of a finished exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExamOutcome {
    /// Correct answers.
    pub correct: usize,
    /// Questions in the exam.
    pub total: usize,
    /// Reward applied, after talent bonuses.
    pub reward: Reward,
}

/// Result of a submitted qualification exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualificationOutcome {
    /// Correct answers.
    pub correct: usize,
    /// Questions in the exam.
    pub total: usize,
    /// Whether the pass mark was met.
    pub passed: bool,
    /// Rank after the exam.
    pub rank: Rank,
}

#[derive(Debug)]
struct ExamSheet {
    questions: Vec<ExamQuestion>,
    answers: Vec<Option<AnswerKey>>,
}

impl ExamSheet {
    fn new(questions: Vec<ExamQuestion>) -> Self {
        let answers = vec![None; questions.len()];
        Self { questions, answers }
    }
}

#[derive(Debug)]
struct QualificationSheet {
    target: Rank,
    questions: Vec<ExamQuestion>,
}

#[derive(Debug, Default)]
struct Pending {
    case: Option<ClinicalCase>,
    exam: Option<ExamSheet>,
    qualification: Option<QualificationSheet>,
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SessionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|held| {
                tracing::debug!(held, "rejecting concurrent request");
                SessionError::Busy
            })?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn usable_questions(questions: Vec<ExamQuestion>) -> Vec<ExamQuestion> {
    questions
        .into_iter()
        .filter(|q| match check_question(q) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(question = %q.id, error = %e, "skipping malformed question");
                false
            }
        })
        .collect()
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One player's game, wired to its collaborators.
pub struct GameSession<S, G, Q> {
    store: SharedStore<S>,
    generator: G,
    bank: Q,
    rules: GameRules,
    ladder: RankLadder,
    user_id: String,
    busy: AtomicBool,
    pending: Mutex<Pending>,
}

impl<S, G, Q> GameSession<S, G, Q>
where
    S: SaveStorage,
    G: CaseGenerator,
    Q: QuestionBank,
{
    /// Create a session over a loaded store.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidThresholds`] if the rank thresholds
    /// decrease along the ladder.
    pub async fn new(
        store: SharedStore<S>,
        generator: G,
        bank: Q,
        user_id: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let rules = store.lock().await.rules().clone();
        let ladder = RankLadder::new(rules.ranks.clone())?;
        Ok(Self {
            store,
            generator,
            bank,
            rules,
            ladder,
            user_id: user_id.into(),
            busy: AtomicBool::new(false),
            pending: Mutex::new(Pending::default()),
        })
    }

    /// The shared store, e.g. for the energy ticker.
    pub const fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    /// The case generator.
    pub const fn generator(&self) -> &G {
        &self.generator
    }

    /// The question bank.
    pub const fn bank(&self) -> &Q {
        &self.bank
    }

    /// The rules in effect.
    pub const fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Whether a collaborator call is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> GameState {
        self.store.lock().await.state().clone()
    }

    /// Promotion status for the current state.
    pub async fn promotion_status(&self) -> PromotionStatus {
        let store = self.store.lock().await;
        let state = store.state();
        self.ladder.status(state.experience, state.rank)
    }

    /// Progress toward the next rank, 0 to 100.
    pub async fn rank_progress(&self) -> u64 {
        let store = self.store.lock().await;
        let state = store.state();
        self.ladder.progress_percent(state.experience, state.rank)
    }

    async fn require_energy(&self, cost: u32) -> Result<GameState, SessionError> {
        let state = self.snapshot().await;
        energy::can_afford(state.energy, cost)?;
        Ok(state)
    }

    async fn spend_energy(&self, cost: u32) -> Result<GameState, SessionError> {
        let mut store = self.store.lock().await;
        let state = store.apply(|s| energy::spend(s, cost))?;
        Ok(state.clone())
    }

    // -- Clinical cases -----------------------------------------------------

    /// Generate a case for the player's rank.
    ///
    /// Returns the case as the player sees it: fields behind equipment the
    /// player does not own are blanked.
    pub async fn start_case(&self) -> Result<ClinicalCase, SessionError> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let cost = self.rules.energy.case_cost;
        let state = self.require_energy(cost).await?;

        let case = self.generator.generate_case(state.rank).await?;
        let state = self.spend_energy(cost).await?;
        tracing::info!(
            rank = %state.rank,
            species = %case.species,
            energy = state.energy,
            "clinical case started"
        );

        let view = reveal_case(&case, &state.inventory);
        self.pending.lock().await.case = Some(case);
        Ok(view)
    }

    /// Grade the diagnosis and plan for the active case and apply the
    /// outcome.
    ///
    /// On a collaborator failure the case stays active and can be
    /// resubmitted.
    pub async fn submit_case(
        &self,
        diagnosis: &str,
        plan: &str,
    ) -> Result<CaseOutcome, SessionError> {
        let diagnosis = diagnosis.trim();
        let plan = plan.trim();
        if diagnosis.is_empty() || plan.is_empty() {
            return Err(SessionError::EmptySubmission);
        }
        let _busy = BusyGuard::acquire(&self.busy)?;
        let case = self
            .pending
            .lock()
            .await
            .case
            .clone()
            .ok_or(SessionError::NoActiveCase)?;

        let evaluation = self.generator.evaluate(&case, diagnosis, plan).await?;
        self.pending.lock().await.case = None;

        let record = CaseHistoryItem {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            case_data: case,
            result: evaluation.clone(),
            user_diagnosis: diagnosis.to_owned(),
            user_plan: plan.to_owned(),
        };

        let mut store = self.store.lock().await;
        let mut outcome = None;
        let state = store.apply(|state| {
            let (state, case_outcome) = self.settle_case(state, &evaluation, record);
            outcome = Some(case_outcome);
            Ok::<_, SessionError>(state)
        })?;
        tracing::info!(
            correct = evaluation.is_correct,
            score = evaluation.score,
            money = state.money,
            experience = state.experience,
            "clinical case settled"
        );
        outcome.ok_or(SessionError::NoActiveCase)
    }

    fn settle_case(
        &self,
        state: GameState,
        evaluation: &EvaluationResult,
        record: CaseHistoryItem,
    ) -> (GameState, CaseOutcome) {
        let bonuses = TalentBonuses::from_nodes(&state.talents);
        let base = ClinicalPolicy::new(&self.rules.clinical)
            .reward(evaluation.is_correct, evaluation.score);
        let reward = apply_bonuses(base, &bonuses, Some(evaluation.score));

        let mut state = apply_reward(state, reward);
        let milestones = record_case(
            &state.milestones,
            &self.rules.milestones,
            evaluation.is_correct,
            evaluation.score,
        );
        state.milestones = milestones.progress.clone();
        state.skill_points = state.skill_points.saturating_add(milestones.skill_points);
        state.total_patients_treated = state.total_patients_treated.saturating_add(1);
        state.case_history.insert(0, record);

        let promotion = self.ladder.status(state.experience, state.rank);
        let outcome = CaseOutcome {
            evaluation: evaluation.clone(),
            reward,
            milestones,
            promotion,
        };
        (state, outcome)
    }

    // -- Exams --------------------------------------------------------------

    /// Draw up to `count` questions and start an exam.
    pub async fn start_exam(
        &self,
        count: usize,
        subject: Option<&str>,
    ) -> Result<Vec<ExamQuestion>, SessionError> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let cost = self.rules.energy.exam_cost;
        self.require_energy(cost).await?;

        let questions = usable_questions(self.bank.random_questions(count, subject).await?);
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        let state = self.spend_energy(cost).await?;
        tracing::info!(
            questions = questions.len(),
            subject = subject.unwrap_or("all"),
            energy = state.energy,
            "exam started"
        );

        self.pending.lock().await.exam = Some(ExamSheet::new(questions.clone()));
        Ok(questions)
    }

    /// Grade the answer to question `index` of the active exam.
    ///
    /// The answer is recorded with the question bank on a best-effort
    /// basis; a recording failure is logged and does not affect grading.
    pub async fn answer_question(
        &self,
        index: usize,
        answer: AnswerKey,
        time_spent: u32,
    ) -> Result<AnswerFeedback, SessionError> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let (question, is_correct) = {
            let mut pending = self.pending.lock().await;
            let sheet = pending.exam.as_mut().ok_or(SessionError::NoActiveExam)?;
            let len = sheet.questions.len();
            let question = sheet
                .questions
                .get(index)
                .cloned()
                .ok_or(SessionError::QuestionIndex { index, len })?;
            let is_correct = validate(&question.correct_answer, &answer);
            if let Some(slot) = sheet.answers.get_mut(index) {
                *slot = Some(answer.clone());
            }
            (question, is_correct)
        };

        let record = AnswerRecord {
            user_id: self.user_id.clone(),
            question_id: question.id.clone(),
            user_answer: answer,
            is_correct,
            time_spent,
        };
        if let Err(e) = self.bank.record_answer(&record).await {
            tracing::warn!(question = %question.id, error = %e, "failed to record answer");
        }

        Ok(AnswerFeedback {
            is_correct,
            explanation: question.explanation,
            correct_answer: question.correct_answer,
        })
    }

    /// Close the active exam and apply its reward. Unanswered questions
    /// count as wrong.
    pub async fn finish_exam(&self) -> Result<ExamOutcome, SessionError> {
        let sheet = self
            .pending
            .lock()
            .await
            .exam
            .take()
            .ok_or(SessionError::NoActiveExam)?;
        let correct = grade(&sheet.questions, &sheet.answers)?;
        let total = sheet.questions.len();

        let mut store = self.store.lock().await;
        let mut reward = Reward::default();
        let state = store.apply(|state| {
            let bonuses = TalentBonuses::from_nodes(&state.talents);
            let base = ExamPolicy::new(&self.rules.exam).reward(correct > 0, count_u32(correct));
            reward = apply_bonuses(base, &bonuses, None);
            Ok::<_, SessionError>(apply_reward(state, reward))
        })?;
        tracing::info!(
            correct,
            total,
            experience = state.experience,
            "exam finished"
        );
        Ok(ExamOutcome {
            correct,
            total,
            reward,
        })
    }

    // -- Qualification ------------------------------------------------------

    /// Start the qualification exam for the next rank.
    ///
    /// Requires eligibility. Costs no energy.
    pub async fn start_qualification(&self) -> Result<Vec<ExamQuestion>, SessionError> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let state = self.snapshot().await;
        let PromotionStatus::Eligible { next } = self.ladder.status(state.experience, state.rank)
        else {
            return Err(EngineError::NotEligible(state.rank).into());
        };

        let count = self.rules.qualification.question_count;
        let questions = usable_questions(self.generator.qualification_exam(next, count).await?);
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        tracing::info!(from = %state.rank, to = %next, questions = questions.len(), "qualification started");

        self.pending.lock().await.qualification = Some(QualificationSheet {
            target: next,
            questions: questions.clone(),
        });
        Ok(questions)
    }

    /// Grade the qualification answers and promote on a pass.
    pub async fn submit_qualification(
        &self,
        answers: &[Option<AnswerKey>],
    ) -> Result<QualificationOutcome, SessionError> {
        let sheet = self
            .pending
            .lock()
            .await
            .qualification
            .take()
            .ok_or(SessionError::NoActiveQualification)?;
        let correct = match grade(&sheet.questions, answers) {
            Ok(correct) => correct,
            Err(e) => {
                self.pending.lock().await.qualification = Some(sheet);
                return Err(e.into());
            }
        };
        let total = sheet.questions.len();
        let passed = qualification_passed(&self.rules.qualification, correct);

        let mut store = self.store.lock().await;
        let state = store.apply(|s| self.ladder.apply_qualification(s, passed))?;
        tracing::info!(
            to = %sheet.target,
            correct,
            total,
            passed,
            rank = %state.rank,
            "qualification submitted"
        );
        Ok(QualificationOutcome {
            correct,
            total,
            passed,
            rank: state.rank,
        })
    }

    // -- Clinic -------------------------------------------------------------

    /// Buy a piece of equipment at the talent-adjusted price.
    pub async fn buy_equipment(&self, id: &str) -> Result<GameState, SessionError> {
        let mut store = self.store.lock().await;
        let state = store.apply(|s| {
            let bonuses = TalentBonuses::from_nodes(&s.talents);
            purchase(s, id, bonuses.price_percent)
        })?;
        Ok(state.clone())
    }

    /// Spend skill points on a talent.
    pub async fn unlock_talent(&self, id: &str) -> Result<GameState, SessionError> {
        let mut store = self.store.lock().await;
        let state = store.apply(|s| unlock_talent(s, id))?;
        Ok(state.clone())
    }

    /// Abandon any activity and restore a fresh game.
    pub async fn reset(&self) -> GameState {
        *self.pending.lock().await = Pending::default();
        self.store.lock().await.reset().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vetlogic_store::{DEFAULT_SAVE_KEY, GameStore, MemoryStorage};
    use vetlogic_types::{GameStatePatch, Vitals};

    use super::*;
    use crate::collab::StubCaseGenerator;
    use crate::question_bank::StaticQuestionBank;

    type TestSession = GameSession<MemoryStorage, StubCaseGenerator, StaticQuestionBank>;

    fn case() -> ClinicalCase {
        ClinicalCase {
            species: "犬".to_owned(),
            tpr: Some(Vitals {
                temp: 39.8,
                hr: 140.0,
                rr: 40.0,
                bp: Some("150/90".to_owned()),
                ..Vitals::default()
            }),
            ..ClinicalCase::default()
        }
    }

    fn evaluation(is_correct: bool, score: u32) -> EvaluationResult {
        EvaluationResult {
            is_correct,
            score,
            feedback: "ok".to_owned(),
            correct_diagnosis: "细小病毒".to_owned(),
            standard_of_care: "补液".to_owned(),
        }
    }

    #[allow(clippy::unwrap_used)]
    async fn session_with(generator: StubCaseGenerator, patch: GameStatePatch) -> TestSession {
        let mut store = GameStore::load(MemoryStorage::new(), DEFAULT_SAVE_KEY, GameRules::default());
        store.update(patch);
        GameSession::new(
            Arc::new(Mutex::new(store)),
            generator,
            StaticQuestionBank::builtin().unwrap(),
            "tester",
        )
        .await
        .unwrap()
    }

    async fn session(is_correct: bool, score: u32) -> TestSession {
        let generator = StubCaseGenerator::new()
            .with_case(case())
            .with_evaluation(evaluation(is_correct, score));
        session_with(generator, GameStatePatch::default()).await
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn case_flow_applies_reward_and_history() {
        let session = session(true, 80).await;
        let view = session.start_case().await.unwrap();
        // Basic kit reveals vitals but not blood pressure.
        assert!(view.tpr.as_ref().is_some_and(|t| t.bp.is_none()));
        assert_eq!(session.snapshot().await.energy, 85);

        let outcome = session.submit_case("细小病毒", "补液").await.unwrap();
        assert_eq!(outcome.reward.money, 700);
        assert_eq!(outcome.reward.experience, 80);

        let state = session.snapshot().await;
        assert_eq!(state.money, 5700);
        assert_eq!(state.reputation, 60);
        assert_eq!(state.experience, 80);
        assert_eq!(state.total_patients_treated, 1);
        assert_eq!(state.milestones.total_cured, 1);
        assert_eq!(state.case_history.len(), 1);
        // History keeps the full case, not the gated view.
        let recorded = &state.case_history.first().unwrap().case_data;
        assert!(recorded.tpr.as_ref().is_some_and(|t| t.bp.is_some()));
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn history_is_most_recent_first() {
        let session = session(true, 80).await;
        for diagnosis in ["first", "second"] {
            session.start_case().await.unwrap();
            session.submit_case(diagnosis, "plan").await.unwrap();
        }
        let state = session.snapshot().await;
        let order: Vec<&str> = state
            .case_history
            .iter()
            .map(|item| item.user_diagnosis.as_str())
            .collect();
        assert_eq!(order, ["second", "first"]);
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn failed_case_penalises() {
        let session = session(false, 20).await;
        session.start_case().await.unwrap();
        let outcome = session.submit_case("感冒", "休息").await.unwrap();
        assert_eq!(outcome.reward.money, -100);
        let state = session.snapshot().await;
        assert_eq!(state.money, 4900);
        assert_eq!(state.reputation, 45);
        assert_eq!(state.experience, 10);
        assert_eq!(state.milestones.total_cured, 0);
    }

    #[tokio::test]
    async fn low_energy_blocks_case_before_generation() {
        let generator = StubCaseGenerator::new();
        let session = session_with(
            generator,
            GameStatePatch {
                energy: Some(10),
                ..GameStatePatch::default()
            },
        )
        .await;
        let err = session.start_case().await;
        assert!(matches!(
            err,
            Err(SessionError::Rule(EngineError::InsufficientEnergy {
                required: 15,
                available: 10
            }))
        ));
        assert!(session.generator.last_rank().is_none());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn collaborator_failure_costs_nothing() {
        let session = session(true, 90).await;
        session.generator.set_failing(true);
        let err = session.start_case().await;
        assert!(matches!(err, Err(SessionError::Collaborator(_))));
        assert_eq!(session.snapshot().await.energy, 100);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn failed_evaluation_keeps_case_active() {
        let session = session(true, 90).await;
        session.start_case().await.unwrap();
        session.generator.set_failing(true);
        assert!(session.submit_case("d", "p").await.is_err());
        session.generator.set_failing(false);
        assert!(session.submit_case("d", "p").await.is_ok());
        assert!(matches!(
            session.submit_case("d", "p").await,
            Err(SessionError::NoActiveCase)
        ));
    }

    #[tokio::test]
    async fn blank_submission_rejected() {
        let session = session(true, 90).await;
        assert!(matches!(
            session.submit_case("  ", "plan").await,
            Err(SessionError::EmptySubmission)
        ));
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn busy_flag_rejects_second_call() {
        let session = session(true, 90).await;
        let _held = BusyGuard::acquire(&session.busy).unwrap();
        assert!(matches!(session.start_case().await, Err(SessionError::Busy)));
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn tenth_cure_awards_skill_points() {
        let session = session(true, 100).await;
        for _ in 0..10 {
            session.start_case().await.unwrap();
            session.submit_case("d", "p").await.unwrap();
            session
                .store()
                .lock()
                .await
                .update(GameStatePatch {
                    energy: Some(100),
                    ..GameStatePatch::default()
                });
        }
        let state = session.snapshot().await;
        assert_eq!(state.milestones.total_cured, 10);
        assert_eq!(state.milestones.perfect_scores, 10);
        // Cure threshold 10 plus perfect thresholds 5 and 10.
        assert_eq!(state.skill_points, 6);
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn exam_flow_grades_and_rewards() {
        let session = session(true, 90).await;
        let questions = session.start_exam(3, None).await.unwrap();
        assert_eq!(questions.len(), 3);
        assert_eq!(session.snapshot().await.energy, 80);

        let first = questions.first().unwrap();
        let feedback = session
            .answer_question(0, first.correct_answer.clone(), 12)
            .await
            .unwrap();
        assert!(feedback.is_correct);
        assert!(matches!(
            session.answer_question(9, AnswerKey::Single(0), 1).await,
            Err(SessionError::QuestionIndex { index: 9, len: 3 })
        ));

        let outcome = session.finish_exam().await.unwrap();
        assert_eq!(outcome.total, 3);
        assert!(outcome.correct >= 1);
        let per_question = GameRules::default().exam.xp_per_question;
        let correct = u64::try_from(outcome.correct).unwrap();
        assert_eq!(session.snapshot().await.experience, per_question * correct);
        assert!(matches!(
            session.finish_exam().await,
            Err(SessionError::NoActiveExam)
        ));
    }

    #[tokio::test]
    async fn exam_with_unknown_subject_costs_nothing() {
        let session = session(true, 90).await;
        assert!(matches!(
            session.start_exam(5, Some("不存在")).await,
            Err(SessionError::NoQuestions)
        ));
        assert_eq!(session.snapshot().await.energy, 100);
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn qualification_requires_eligibility() {
        let session = session(true, 90).await;
        assert!(matches!(
            session.start_qualification().await,
            Err(SessionError::Rule(EngineError::NotEligible(Rank::Student)))
        ));
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn passed_qualification_promotes() {
        let session = session_with(
            StubCaseGenerator::new(),
            GameStatePatch {
                experience: Some(500),
                ..GameStatePatch::default()
            },
        )
        .await;
        let questions = session.start_qualification().await.unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(session.snapshot().await.energy, 100);

        let answers = vec![
            Some(AnswerKey::Single(0)),
            Some(AnswerKey::Single(0)),
            Some(AnswerKey::Single(0)),
            Some(AnswerKey::Single(0)),
            Some(AnswerKey::Single(1)),
        ];
        let outcome = session.submit_qualification(&answers).await.unwrap();
        assert_eq!(outcome.correct, 4);
        assert!(outcome.passed);
        assert_eq!(outcome.rank, Rank::Intern);
        let state = session.snapshot().await;
        assert_eq!(state.rank, Rank::Intern);
        assert_eq!(state.experience, 0);
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn failed_qualification_keeps_rank() {
        let session = session_with(
            StubCaseGenerator::new(),
            GameStatePatch {
                experience: Some(600),
                ..GameStatePatch::default()
            },
        )
        .await;
        session.start_qualification().await.unwrap();
        let answers = vec![Some(AnswerKey::Single(3)); 5];
        let outcome = session.submit_qualification(&answers).await.unwrap();
        assert!(!outcome.passed);
        let state = session.snapshot().await;
        assert_eq!(state.rank, Rank::Student);
        assert_eq!(state.experience, 600);
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn wrong_answer_count_keeps_qualification_open() {
        let session = session_with(
            StubCaseGenerator::new(),
            GameStatePatch {
                experience: Some(500),
                ..GameStatePatch::default()
            },
        )
        .await;
        session.start_qualification().await.unwrap();
        assert!(matches!(
            session.submit_qualification(&[None]).await,
            Err(SessionError::Rule(EngineError::AnswerCountMismatch { .. }))
        ));
        let answers = vec![Some(AnswerKey::Single(0)); 5];
        assert!(session.submit_qualification(&answers).await.is_ok());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn equipment_and_talents() {
        let session = session_with(
            StubCaseGenerator::new(),
            GameStatePatch {
                skill_points: Some(1),
                ..GameStatePatch::default()
            },
        )
        .await;
        let state = session.buy_equipment("hematology").await.unwrap();
        assert_eq!(state.money, 2500);
        assert!(matches!(
            session.buy_equipment("hematology").await,
            Err(SessionError::Rule(EngineError::AlreadyOwned(_)))
        ));

        let state = session.unlock_talent("academic_t1_scholar").await.unwrap();
        assert_eq!(state.skill_points, 0);
        assert!(matches!(
            session.unlock_talent("academic_t1_scholar").await,
            Err(SessionError::Rule(_))
        ));
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn reset_clears_activity() {
        let session = session(true, 90).await;
        session.start_case().await.unwrap();
        let state = session.reset().await;
        assert_eq!(state.energy, 100);
        assert!(matches!(
            session.submit_case("d", "p").await,
            Err(SessionError::NoActiveCase)
        ));
    }
}
