//! The built-in question bank.
//!
//! Fifteen licensing-exam style questions ship with the crate and serve as
//! the bank whenever no remote bank is configured. Answers are logged, not
//! stored.

use rand::Rng;
use rand::seq::SliceRandom;
use vetlogic_engine::check_question;
use vetlogic_types::{AnswerRecord, ExamQuestion};

use crate::collab::{CollabError, QuestionBank};

const BUILTIN_QUESTIONS: &str = include_str!("../data/exam_questions.json");

/// An in-memory [`QuestionBank`].
#[derive(Debug, Clone)]
pub struct StaticQuestionBank {
    questions: Vec<ExamQuestion>,
}

impl StaticQuestionBank {
    /// The bank shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the embedded data is corrupt.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        let questions: Vec<ExamQuestion> = serde_json::from_str(BUILTIN_QUESTIONS)?;
        Ok(Self::from_questions(questions))
    }

    /// A bank over `questions`. Malformed questions are dropped.
    pub fn from_questions(questions: Vec<ExamQuestion>) -> Self {
        let questions = questions
            .into_iter()
            .filter(|q| match check_question(q) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(question = %q.id, error = %e, "dropping malformed question");
                    false
                }
            })
            .collect();
        Self { questions }
    }

    /// Number of questions in the bank.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Draw up to `count` questions in random order using `rng`.
    pub fn draw(
        &self,
        count: usize,
        subject: Option<&str>,
        rng: &mut impl Rng,
    ) -> Vec<ExamQuestion> {
        let mut pool: Vec<&ExamQuestion> = self
            .questions
            .iter()
            .filter(|q| subject.is_none_or(|s| q.subject == s))
            .collect();
        pool.shuffle(rng);
        pool.into_iter().take(count).cloned().collect()
    }

    fn find(&self, id: &str) -> Option<ExamQuestion> {
        self.questions.iter().find(|q| q.id == id).cloned()
    }
}

impl QuestionBank for StaticQuestionBank {
    async fn random_questions(
        &self,
        count: usize,
        subject: Option<&str>,
    ) -> Result<Vec<ExamQuestion>, CollabError> {
        Ok(self.draw(count, subject, &mut rand::rng()))
    }

    async fn question_by_id(&self, id: &str) -> Result<Option<ExamQuestion>, CollabError> {
        Ok(self.find(id))
    }

    async fn record_answer(&self, record: &AnswerRecord) -> Result<(), CollabError> {
        tracing::debug!(
            user = %record.user_id,
            question = %record.question_id,
            correct = record.is_correct,
            time_spent = record.time_spent,
            "answer recorded locally"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use vetlogic_types::{AnswerKey, QuestionType};

    use super::*;

    #[allow(clippy::unwrap_used)]
    fn bank() -> StaticQuestionBank {
        StaticQuestionBank::builtin().unwrap()
    }

    #[test]
    fn builtin_bank_is_complete() {
        let bank = bank();
        assert_eq!(bank.len(), 15);
        let multiple: Vec<&str> = bank
            .questions
            .iter()
            .filter(|q| q.question_type == QuestionType::Multiple)
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(multiple, vec!["q6", "q10", "q13"]);
    }

    #[test]
    fn draw_is_truncated_and_distinct() {
        let bank = bank();
        let mut rng = SmallRng::seed_from_u64(7);
        let drawn = bank.draw(5, None, &mut rng);
        assert_eq!(drawn.len(), 5);
        let ids: BTreeSet<&str> = drawn.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), 5);

        let all = bank.draw(100, None, &mut rng);
        assert_eq!(all.len(), 15);
    }

    #[test]
    fn draw_filters_by_subject() {
        let bank = bank();
        let mut rng = SmallRng::seed_from_u64(1);
        let drawn = bank.draw(15, Some("预防"), &mut rng);
        assert!(!drawn.is_empty());
        assert!(drawn.iter().all(|q| q.subject == "预防"));
        assert!(bank.draw(15, Some("不存在"), &mut rng).is_empty());
    }

    #[test]
    fn malformed_questions_dropped() {
        let bad = ExamQuestion {
            id: "bad".to_owned(),
            question_type: QuestionType::Single,
            stem: "?".to_owned(),
            options: vec!["A".to_owned()],
            correct_answer: AnswerKey::Single(3),
            explanation: String::new(),
            subject: String::new(),
            exam_year: None,
        };
        let bank = StaticQuestionBank::from_questions(vec![bad]);
        assert!(bank.is_empty());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn lookup_by_id() {
        let bank = bank();
        let q = bank.question_by_id("q6").await.unwrap().unwrap();
        assert_eq!(q.correct_answer, AnswerKey::multiple([0, 1, 2, 3]));
        assert!(bank.question_by_id("missing").await.unwrap().is_none());
    }
}
