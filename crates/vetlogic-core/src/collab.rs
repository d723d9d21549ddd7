//! Collaborator interfaces for the game session.
//!
//! The session never talks to the network directly. Case generation and
//! grading go through a [`CaseGenerator`]; exam questions come from a
//! [`QuestionBank`]. Both are injected, so tests drive the session with
//! the stubs in this module.
//!
//! The traits return `impl Future + Send` rather than boxing, so the
//! session is generic over its collaborators and backends that need
//! runtime selection use enum dispatch.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use vetlogic_types::{
    AnswerKey, AnswerRecord, ClinicalCase, EvaluationResult, ExamQuestion, QuestionType, Rank,
};

/// Errors reported by collaborators.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CollabError {
    /// The call did not finish in time.
    #[error("request timed out after {ms} ms")]
    Timeout {
        /// The timeout that elapsed.
        ms: u64,
    },

    /// The API key was rejected.
    #[error("API key is invalid")]
    Unauthorized,

    /// The account is out of balance or rate limited.
    #[error("API balance exhausted or rate limited")]
    QuotaExceeded,

    /// The upstream service failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The upstream answered with something unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The collaborator is missing required configuration.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

/// Generates and grades clinical cases.
pub trait CaseGenerator: Send + Sync {
    /// Generate a case whose difficulty matches `rank`.
    fn generate_case(
        &self,
        rank: Rank,
    ) -> impl Future<Output = Result<ClinicalCase, CollabError>> + Send;

    /// Grade a diagnosis and treatment plan.
    fn evaluate(
        &self,
        case: &ClinicalCase,
        diagnosis: &str,
        plan: &str,
    ) -> impl Future<Output = Result<EvaluationResult, CollabError>> + Send;

    /// Produce `count` qualification questions for promotion to `target`.
    fn qualification_exam(
        &self,
        target: Rank,
        count: usize,
    ) -> impl Future<Output = Result<Vec<ExamQuestion>, CollabError>> + Send;
}

/// Serves exam questions and records answers.
pub trait QuestionBank: Send + Sync {
    /// Up to `count` random questions, optionally limited to `subject`.
    fn random_questions(
        &self,
        count: usize,
        subject: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ExamQuestion>, CollabError>> + Send;

    /// Look up a single question.
    fn question_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<ExamQuestion>, CollabError>> + Send;

    /// Record one answered question.
    fn record_answer(
        &self,
        record: &AnswerRecord,
    ) -> impl Future<Output = Result<(), CollabError>> + Send;
}

// ---------------------------------------------------------------------------
// Stub
// ---------------------------------------------------------------------------

/// A canned [`CaseGenerator`] for tests and offline play.
///
/// Returns the same case and evaluation for every call. Qualification
/// questions are generated with answer index 0. Can be switched into a
/// failing mode to exercise error paths.
#[derive(Debug, Default)]
pub struct StubCaseGenerator {
    case: ClinicalCase,
    evaluation: EvaluationResult,
    failing: AtomicBool,
    last_rank: Mutex<Option<Rank>>,
}

impl StubCaseGenerator {
    /// Create a stub returning an empty case and a failed evaluation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `case` from [`CaseGenerator::generate_case`].
    #[must_use]
    pub fn with_case(mut self, case: ClinicalCase) -> Self {
        self.case = case;
        self
    }

    /// Return `evaluation` from [`CaseGenerator::evaluate`].
    #[must_use]
    pub fn with_evaluation(mut self, evaluation: EvaluationResult) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Make every subsequent call fail with [`CollabError::Upstream`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// Rank of the most recent generation request.
    pub fn last_rank(&self) -> Option<Rank> {
        self.last_rank.lock().ok().and_then(|guard| *guard)
    }

    fn check(&self) -> Result<(), CollabError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(CollabError::Upstream("stub failure".to_owned()));
        }
        Ok(())
    }
}

impl CaseGenerator for StubCaseGenerator {
    async fn generate_case(&self, rank: Rank) -> Result<ClinicalCase, CollabError> {
        self.check()?;
        if let Ok(mut guard) = self.last_rank.lock() {
            *guard = Some(rank);
        }
        Ok(ClinicalCase {
            difficulty: rank.difficulty(),
            ..self.case.clone()
        })
    }

    async fn evaluate(
        &self,
        _case: &ClinicalCase,
        _diagnosis: &str,
        _plan: &str,
    ) -> Result<EvaluationResult, CollabError> {
        self.check()?;
        Ok(self.evaluation.clone())
    }

    async fn qualification_exam(
        &self,
        target: Rank,
        count: usize,
    ) -> Result<Vec<ExamQuestion>, CollabError> {
        self.check()?;
        Ok((1..=count)
            .map(|n| ExamQuestion {
                id: format!("qual-{}-{n}", target.code()),
                question_type: QuestionType::Single,
                stem: format!("{} qualification question {n}", target.label()),
                options: vec![
                    "A".to_owned(),
                    "B".to_owned(),
                    "C".to_owned(),
                    "D".to_owned(),
                ],
                correct_answer: AnswerKey::Single(0),
                explanation: String::new(),
                subject: "资格".to_owned(),
                exam_year: None,
            })
            .collect())
    }
}
