//! Reward computation for clinical cases and exams.
//!
//! Both activities go through the [`RewardPolicy`] trait; the call site
//! picks [`ClinicalPolicy`] or [`ExamPolicy`]. Talent bonuses are layered on
//! afterwards with [`apply_bonuses`], and [`apply_reward`] folds the result
//! into a [`GameState`].

use serde::Serialize;
use vetlogic_types::GameState;

use crate::config::{ClinicalRewards, ExamRewards};
use crate::talent::TalentBonuses;

/// Highest score an evaluation can carry.
pub const MAX_SCORE: u32 = 100;

/// Deltas produced by one completed activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Reward {
    /// Change in money.
    pub money: i64,
    /// Change in reputation.
    pub reputation: i64,
    /// Experience gained.
    pub experience: u64,
}

/// Turns an outcome into a [`Reward`].
pub trait RewardPolicy {
    /// Compute the reward for an outcome. Must be pure.
    fn reward(&self, is_correct: bool, score: u32) -> Reward;
}

/// Clinical case policy: score-scaled income on success, flat penalty on
/// failure.
#[derive(Debug, Clone, Copy)]
pub struct ClinicalPolicy<'a> {
    rules: &'a ClinicalRewards,
}

impl<'a> ClinicalPolicy<'a> {
    /// Create a policy over the given constants.
    pub const fn new(rules: &'a ClinicalRewards) -> Self {
        Self { rules }
    }
}

impl RewardPolicy for ClinicalPolicy<'_> {
    fn reward(&self, is_correct: bool, score: u32) -> Reward {
        let score = score.min(MAX_SCORE);
        if is_correct {
            Reward {
                money: self
                    .rules
                    .base_money
                    .saturating_add(i64::from(score).saturating_mul(self.rules.money_per_point)),
                reputation: self.rules.success_reputation,
                experience: u64::from(score),
            }
        } else {
            Reward {
                money: self.rules.failure_money_penalty.saturating_neg(),
                reputation: self.rules.failure_reputation_penalty.saturating_neg(),
                experience: self.rules.failure_experience,
            }
        }
    }
}

/// Exam policy: `score` is the number of correct answers, each worth a flat
/// amount of experience and reputation.
#[derive(Debug, Clone, Copy)]
pub struct ExamPolicy<'a> {
    rules: &'a ExamRewards,
}

impl<'a> ExamPolicy<'a> {
    /// Create a policy over the given constants.
    pub const fn new(rules: &'a ExamRewards) -> Self {
        Self { rules }
    }
}

impl RewardPolicy for ExamPolicy<'_> {
    fn reward(&self, _is_correct: bool, score: u32) -> Reward {
        Reward {
            money: 0,
            reputation: i64::from(score).saturating_mul(self.rules.reputation_per_question),
            experience: u64::from(score).saturating_mul(self.rules.xp_per_question),
        }
    }
}

fn percent_of(value: u64, percent: u32) -> u64 {
    value
        .saturating_mul(u64::from(percent))
        .checked_div(100)
        .unwrap_or(0)
}

fn percent_of_signed(value: i64, percent: u32) -> i64 {
    value
        .saturating_mul(i64::from(percent))
        .checked_div(100)
        .unwrap_or(0)
}

/// Layer talent bonuses over a base reward.
///
/// Experience and positive reputation gains are scaled up. The tip applies
/// to positive money only, and only when `tip_score` meets the talent's
/// threshold; pass `None` for activities without a tip.
pub fn apply_bonuses(reward: Reward, bonuses: &TalentBonuses, tip_score: Option<u32>) -> Reward {
    let experience = reward
        .experience
        .saturating_add(percent_of(reward.experience, bonuses.xp_percent));

    let reputation = if reward.reputation > 0 {
        reward
            .reputation
            .saturating_add(percent_of_signed(reward.reputation, bonuses.reputation_percent))
    } else {
        reward.reputation
    };

    let tip_applies = bonuses.tip_percent > 0
        && reward.money > 0
        && tip_score.is_some_and(|s| s >= bonuses.tip_min_score);
    let money = if tip_applies {
        reward
            .money
            .saturating_add(percent_of_signed(reward.money, bonuses.tip_percent))
    } else {
        reward.money
    };

    Reward {
        money,
        reputation,
        experience,
    }
}

/// Fold a reward into the state.
pub fn apply_reward(state: GameState, reward: Reward) -> GameState {
    GameState {
        money: state.money.saturating_add(reward.money),
        reputation: state.reputation.saturating_add(reward.reputation),
        experience: state.experience.saturating_add(reward.experience),
        ..state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clinical_success_scales_with_score() {
        let rules = ClinicalRewards::default();
        let r = ClinicalPolicy::new(&rules).reward(true, 80);
        assert_eq!(
            r,
            Reward {
                money: 700,
                reputation: 10,
                experience: 80
            }
        );
    }

    #[test]
    fn clinical_failure_is_flat() {
        let rules = ClinicalRewards::default();
        let policy = ClinicalPolicy::new(&rules);
        let expected = Reward {
            money: -100,
            reputation: -5,
            experience: 10,
        };
        assert_eq!(policy.reward(false, 0), expected);
        assert_eq!(policy.reward(false, 95), expected);
    }

    #[test]
    fn clinical_score_is_clamped() {
        let rules = ClinicalRewards::default();
        let policy = ClinicalPolicy::new(&rules);
        assert_eq!(policy.reward(true, 250), policy.reward(true, 100));
    }

    #[test]
    fn exam_pays_per_correct_answer() {
        let rules = ExamRewards::default();
        let r = ExamPolicy::new(&rules).reward(true, 3);
        assert_eq!(r.experience, 150);
        assert_eq!(r.reputation, 30);
        assert_eq!(r.money, 0);
        assert_eq!(ExamPolicy::new(&rules).reward(false, 0), Reward::default());
    }

    #[test]
    fn bonuses_scale_gains_not_losses() {
        let bonuses = TalentBonuses {
            xp_percent: 10,
            reputation_percent: 20,
            ..TalentBonuses::default()
        };
        let gain = apply_bonuses(
            Reward {
                money: 100,
                reputation: 10,
                experience: 100,
            },
            &bonuses,
            None,
        );
        assert_eq!(gain.experience, 110);
        assert_eq!(gain.reputation, 12);
        assert_eq!(gain.money, 100);

        let loss = apply_bonuses(
            Reward {
                money: -100,
                reputation: -5,
                experience: 10,
            },
            &bonuses,
            None,
        );
        assert_eq!(loss.reputation, -5);
        assert_eq!(loss.money, -100);
    }

    #[test]
    fn tip_requires_score_threshold() {
        let bonuses = TalentBonuses {
            tip_percent: 10,
            tip_min_score: 90,
            ..TalentBonuses::default()
        };
        let base = Reward {
            money: 800,
            reputation: 10,
            experience: 100,
        };
        assert_eq!(apply_bonuses(base, &bonuses, Some(95)).money, 880);
        assert_eq!(apply_bonuses(base, &bonuses, Some(85)).money, 800);
        assert_eq!(apply_bonuses(base, &bonuses, None).money, 800);
    }
}
