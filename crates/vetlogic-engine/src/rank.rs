//! Rank progression.
//!
//! Reaching the next rank's threshold only makes the player *eligible*;
//! the rank changes through a passed qualification exam, which resets
//! experience to zero. Surplus experience is discarded.

use serde::Serialize;
use vetlogic_types::{GameState, Rank};

use crate::config::{QualificationRules, RankThresholds};
use crate::error::EngineError;

/// Where a player stands relative to the next rank.
///
/// Serializes as `{"status": "eligible", "next": ...}` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PromotionStatus {
    /// Threshold reached; the qualification exam may be taken.
    Eligible {
        /// The rank the exam leads to.
        next: Rank,
    },
    /// More experience needed.
    Pending {
        /// The rank being worked toward.
        next: Rank,
        /// Experience still missing.
        remaining: u64,
    },
    /// Already at the top of the ladder.
    Terminal,
}

/// Validated experience thresholds for every rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankLadder {
    thresholds: RankThresholds,
}

impl RankLadder {
    /// Build a ladder, rejecting thresholds that decrease along the ranks.
    pub fn new(thresholds: RankThresholds) -> Result<Self, EngineError> {
        for (lower, higher) in Rank::ALL.iter().zip(Rank::ALL.iter().skip(1)) {
            if thresholds.for_rank(*lower) > thresholds.for_rank(*higher) {
                return Err(EngineError::InvalidThresholds {
                    lower: *lower,
                    higher: *higher,
                });
            }
        }
        Ok(Self { thresholds })
    }

    /// Experience needed to become eligible for `rank`.
    pub const fn threshold(&self, rank: Rank) -> u64 {
        self.thresholds.for_rank(rank)
    }

    /// Full promotion status for a player.
    pub const fn status(&self, experience: u64, current: Rank) -> PromotionStatus {
        let Some(next) = current.next() else {
            return PromotionStatus::Terminal;
        };
        let needed = self.threshold(next);
        if experience >= needed {
            PromotionStatus::Eligible { next }
        } else {
            PromotionStatus::Pending {
                next,
                remaining: needed.saturating_sub(experience),
            }
        }
    }

    /// The rank the player may qualify for: `next` when eligible, otherwise
    /// `current`.
    pub const fn check_promotion(&self, experience: u64, current: Rank) -> Rank {
        match self.status(experience, current) {
            PromotionStatus::Eligible { next } => next,
            PromotionStatus::Pending { .. } | PromotionStatus::Terminal => current,
        }
    }

    /// Progress toward the next rank as a whole percentage, capped at 100.
    ///
    /// Measured from the current rank's threshold to the next one's.
    /// Always 100 at the terminal rank.
    pub fn progress_percent(&self, experience: u64, current: Rank) -> u64 {
        let Some(next) = current.next() else {
            return 100;
        };
        let floor = self.threshold(current);
        let span = self.threshold(next).saturating_sub(floor);
        if span == 0 {
            return 100;
        }
        experience
            .saturating_sub(floor)
            .saturating_mul(100)
            .checked_div(span)
            .unwrap_or(100)
            .min(100)
    }

    /// Apply a qualification exam outcome.
    ///
    /// On a pass the rank advances one tier and experience resets to zero.
    /// On a fail the state is returned unchanged. Taking the exam without
    /// being eligible is an error.
    pub fn apply_qualification(
        &self,
        state: GameState,
        passed: bool,
    ) -> Result<GameState, EngineError> {
        let PromotionStatus::Eligible { next } = self.status(state.experience, state.rank) else {
            return Err(EngineError::NotEligible(state.rank));
        };
        if !passed {
            return Ok(state);
        }
        tracing::info!(from = %state.rank, to = %next, "rank promotion");
        Ok(GameState {
            rank: next,
            experience: 0,
            ..state
        })
    }
}

/// Whether `correct` answers out of a qualification sheet pass.
pub const fn qualification_passed(rules: &QualificationRules, correct: usize) -> bool {
    correct >= rules.pass_mark
}
