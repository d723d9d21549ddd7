//! Answer validation for single- and multiple-choice questions.
//!
//! Grading is binary. A single-choice key matches exactly one index; a
//! multiple-choice key matches by set equality, so order and duplicates in
//! the submission are irrelevant.

use vetlogic_types::{AnswerKey, ExamQuestion, QuestionType};

use crate::error::EngineError;

/// Decide whether `submitted` answers a question keyed by `correct`.
///
/// A one-element set submitted against a single-choice key is unwrapped.
/// An empty submission is never correct.
pub fn validate(correct: &AnswerKey, submitted: &AnswerKey) -> bool {
    match (correct, submitted) {
        (AnswerKey::Single(key), AnswerKey::Single(given)) => key == given,
        (AnswerKey::Single(key), AnswerKey::Multiple(given)) => {
            given.len() == 1 && given.contains(key)
        }
        (AnswerKey::Multiple(key), AnswerKey::Single(given)) => {
            key.len() == 1 && key.contains(given)
        }
        (AnswerKey::Multiple(key), AnswerKey::Multiple(given)) => {
            !given.is_empty() && given.len() == key.len() && key.iter().all(|i| given.contains(i))
        }
    }
}

/// Count correct answers across a question sheet.
///
/// `answers[i]` answers `questions[i]`; an unanswered question is `None`.
pub fn grade(
    questions: &[ExamQuestion],
    answers: &[Option<AnswerKey>],
) -> Result<usize, EngineError> {
    if questions.len() != answers.len() {
        return Err(EngineError::AnswerCountMismatch {
            expected: questions.len(),
            actual: answers.len(),
        });
    }
    Ok(questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| a.as_ref().is_some_and(|a| validate(&q.correct_answer, a)))
        .count())
}

/// Reject a question whose key cannot be answered.
///
/// Checks that every key index names an option and that the key shape
/// agrees with `question_type`. Applied to questions arriving from
/// external collaborators.
pub fn check_question(question: &ExamQuestion) -> Result<(), EngineError> {
    let malformed = |reason: &str| EngineError::MalformedQuestion {
        id: question.id.clone(),
        reason: reason.to_owned(),
    };

    if question.options.is_empty() {
        return Err(malformed("no options"));
    }
    let indices = question.correct_answer.indices();
    if indices.is_empty() {
        return Err(malformed("empty answer key"));
    }
    let option_count = question.options.len();
    if indices
        .iter()
        .any(|i| usize::try_from(*i).map_or(true, |i| i >= option_count))
    {
        return Err(malformed("answer index out of range"));
    }
    if question.question_type == QuestionType::Single && indices.len() != 1 {
        return Err(malformed("single-choice question with several answers"));
    }
    Ok(())
}
