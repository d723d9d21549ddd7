//! Error types for the vetlogic-engine crate.
//!
//! The rules are pure functions; every rejection is a typed error rather
//! than a panic. Callers surface these to the player before any state
//! change happens.

use vetlogic_types::Rank;

/// Errors raised by the game rules.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    /// Not enough energy for the requested activity.
    #[error("insufficient energy: need {required}, have {available}")]
    InsufficientEnergy {
        /// Energy the activity costs.
        required: u32,
        /// Energy the player has.
        available: u32,
    },

    /// Not enough money for a purchase.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Price after discounts.
        required: i64,
        /// Money the player has.
        available: i64,
    },

    /// Equipment id not present in the inventory.
    #[error("unknown equipment: {0}")]
    UnknownEquipment(String),

    /// Equipment already owned.
    #[error("equipment already owned: {0}")]
    AlreadyOwned(String),

    /// Talent id not present in the tree.
    #[error("unknown talent: {0}")]
    UnknownTalent(String),

    /// A talent failed its unlock preconditions.
    #[error("talent {id} cannot be unlocked: {reason}")]
    TalentLocked {
        /// The talent id.
        id: String,
        /// Which precondition failed.
        reason: String,
    },

    /// The talent definitions are not a valid forest.
    #[error("invalid talent tree: {0}")]
    InvalidTalentTree(String),

    /// Rank thresholds decrease somewhere along the ladder.
    #[error("rank thresholds must be non-decreasing: {lower:?} > {higher:?}")]
    InvalidThresholds {
        /// The lower rank with the larger threshold.
        lower: Rank,
        /// The higher rank with the smaller threshold.
        higher: Rank,
    },

    /// A promotion was requested without meeting the requirements.
    #[error("not eligible for promotion from {0}")]
    NotEligible(Rank),

    /// An exam question is internally inconsistent.
    #[error("malformed question {id}: {reason}")]
    MalformedQuestion {
        /// The question id.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Answer count does not match question count.
    #[error("expected {expected} answers, got {actual}")]
    AnswerCountMismatch {
        /// Number of questions.
        expected: usize,
        /// Number of answers.
        actual: usize,
    },

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
