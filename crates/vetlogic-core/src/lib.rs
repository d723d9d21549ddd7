//! Orchestration layer for the `VetLogic` game.
//!
//! Binds the pure rules and the save store to the outside world: YAML
//! configuration, the collaborator interfaces for case generation and the
//! question bank, and the [`GameSession`] that runs every player activity.
//!
//! # Modules
//!
//! - [`collab`] -- [`CaseGenerator`] and [`QuestionBank`] traits, stub generator
//! - [`config`] -- `vetlogic-config.yaml` loading with environment overrides
//! - [`question_bank`] -- The built-in static question bank
//! - [`session`] -- [`GameSession`] activity flows and [`SessionError`]

pub mod collab;
pub mod config;
pub mod question_bank;
pub mod session;

pub use collab::{CaseGenerator, CollabError, QuestionBank, StubCaseGenerator};
pub use config::{ConfigError, VetLogicConfig};
pub use question_bank::StaticQuestionBank;
pub use session::{
    AnswerFeedback, CaseOutcome, ExamOutcome, GameSession, QualificationOutcome, SessionError,
};
