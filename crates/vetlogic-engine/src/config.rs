//! Tunable game rules and their defaults.
//!
//! These values correspond to the `rules` section of
//! `vetlogic-config.yaml`. Every field has a default so a partial YAML
//! section still yields a complete [`GameRules`]; callers (the session,
//! tests) construct this once and pass it into the engine functions.

use serde::{Deserialize, Serialize};
use vetlogic_types::Rank;

/// Every tunable rule in one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Values for a brand-new player.
    pub starting: StartingRules,
    /// Clinical case rewards.
    pub clinical: ClinicalRewards,
    /// Exam rewards.
    pub exam: ExamRewards,
    /// Experience required to become eligible for each rank.
    pub ranks: RankThresholds,
    /// Qualification exam rules.
    pub qualification: QualificationRules,
    /// Milestone thresholds and awards.
    pub milestones: MilestoneRules,
    /// Energy costs and regeneration.
    pub energy: EnergyRules,
}

/// Values for a brand-new player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingRules {
    /// Starting money (default: 5000).
    pub money: i64,
    /// Starting reputation (default: 50).
    pub reputation: i64,
    /// Starting and maximum energy (default: 100).
    pub max_energy: u32,
}

impl Default for StartingRules {
    fn default() -> Self {
        Self {
            money: 5000,
            reputation: 50,
            max_energy: 100,
        }
    }
}

/// Rewards for a completed clinical case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalRewards {
    /// Money on success before the score bonus (default: 300).
    pub base_money: i64,
    /// Money per score point on success (default: 5).
    pub money_per_point: i64,
    /// Reputation gained on success (default: 10).
    pub success_reputation: i64,
    /// Money lost on failure (default: 100).
    pub failure_money_penalty: i64,
    /// Reputation lost on failure (default: 5).
    pub failure_reputation_penalty: i64,
    /// Experience granted on failure (default: 10).
    pub failure_experience: u64,
}

impl Default for ClinicalRewards {
    fn default() -> Self {
        Self {
            base_money: 300,
            money_per_point: 5,
            success_reputation: 10,
            failure_money_penalty: 100,
            failure_reputation_penalty: 5,
            failure_experience: 10,
        }
    }
}

/// Rewards per correct exam answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamRewards {
    /// Experience per correct answer (default: 50).
    pub xp_per_question: u64,
    /// Reputation per correct answer (default: 10).
    pub reputation_per_question: i64,
}

impl Default for ExamRewards {
    fn default() -> Self {
        Self {
            xp_per_question: 50,
            reputation_per_question: 10,
        }
    }
}

/// Experience threshold per rank. Must be non-decreasing along the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankThresholds {
    /// Always 0 in practice.
    pub student: u64,
    /// Default: 500.
    pub intern: u64,
    /// Default: 2000.
    pub resident: u64,
    /// Default: 5000.
    pub specialist: u64,
    /// Default: 15000.
    pub chief: u64,
}

impl Default for RankThresholds {
    fn default() -> Self {
        Self {
            student: 0,
            intern: 500,
            resident: 2000,
            specialist: 5000,
            chief: 15000,
        }
    }
}

impl RankThresholds {
    /// Threshold for `rank`.
    pub const fn for_rank(&self, rank: Rank) -> u64 {
        match rank {
            Rank::Student => self.student,
            Rank::Intern => self.intern,
            Rank::Resident => self.resident,
            Rank::Specialist => self.specialist,
            Rank::Chief => self.chief,
        }
    }
}

/// Qualification exam rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualificationRules {
    /// Questions per exam (default: 5).
    pub question_count: usize,
    /// Correct answers needed to pass (default: 4).
    pub pass_mark: usize,
}

impl Default for QualificationRules {
    fn default() -> Self {
        Self {
            question_count: 5,
            pass_mark: 4,
        }
    }
}

/// Milestone thresholds and the skill points each one awards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneRules {
    /// Cumulative cure counts that award skill points.
    pub cure_thresholds: Vec<u32>,
    /// Cumulative perfect-score counts that award skill points.
    pub perfect_thresholds: Vec<u32>,
    /// Skill points per milestone reached (default: 2).
    pub skill_points_per_milestone: u32,
    /// Score that counts as perfect (default: 100).
    pub perfect_score: u32,
}

impl Default for MilestoneRules {
    fn default() -> Self {
        Self {
            cure_thresholds: vec![10, 25, 50, 100],
            perfect_thresholds: vec![5, 10, 20],
            skill_points_per_milestone: 2,
            perfect_score: 100,
        }
    }
}

/// Energy costs and regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyRules {
    /// Energy to start a clinical case (default: 15).
    pub case_cost: u32,
    /// Energy to start an exam (default: 20).
    pub exam_cost: u32,
    /// Energy restored per tick (default: 1).
    pub regen_amount: u32,
    /// Milliseconds between ticks (default: 10000).
    pub regen_interval_ms: u64,
}

impl Default for EnergyRules {
    fn default() -> Self {
        Self {
            case_cost: 15,
            exam_cost: 20,
            regen_amount: 1,
            regen_interval_ms: 10_000,
        }
    }
}
