//! The player's game state aggregate and its partial-update form.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::clinical::CaseHistoryItem;
use crate::enums::Rank;
use crate::equipment::Equipment;
use crate::talent::TalentNode;

/// Cumulative achievement counters and the thresholds already rewarded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct MilestoneProgress {
    /// Correctly diagnosed cases.
    pub total_cured: u32,
    /// Correct cases with a perfect score.
    pub perfect_scores: u32,
    /// Cure thresholds already awarded.
    pub cured_milestones: Vec<u32>,
    /// Perfect-score thresholds already awarded.
    pub perfect_milestones: Vec<u32>,
}

/// Everything persisted about one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// Cash. May go negative through penalties.
    pub money: i64,
    /// Clinic reputation. May go negative through penalties.
    pub reputation: i64,
    /// Experience toward the next rank.
    pub experience: u64,
    /// Current career tier.
    pub rank: Rank,
    /// Current energy, within `0..=max_energy`.
    pub energy: u32,
    /// Energy ceiling.
    pub max_energy: u32,
    /// Equipment catalog with ownership flags.
    pub inventory: Vec<Equipment>,
    /// Patients seen, correct or not.
    pub total_patients_treated: u32,
    /// Completed cases, most recent first.
    pub case_history: Vec<CaseHistoryItem>,
    /// Unspent skill points.
    pub skill_points: u32,
    /// Talent tree with unlock flags.
    pub talents: Vec<TalentNode>,
    /// Milestone counters.
    pub milestones: MilestoneProgress,
}

/// A shallow partial update of [`GameState`].
///
/// Every present field replaces the corresponding state field wholesale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameStatePatch {
    /// New money.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub money: Option<i64>,
    /// New reputation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reputation: Option<i64>,
    /// New experience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<u64>,
    /// New rank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    /// New energy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<u32>,
    /// New energy ceiling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_energy: Option<u32>,
    /// New inventory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<Equipment>>,
    /// New patient count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_patients_treated: Option<u32>,
    /// New case history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_history: Option<Vec<CaseHistoryItem>>,
    /// New skill point balance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_points: Option<u32>,
    /// New talent tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub talents: Option<Vec<TalentNode>>,
    /// New milestone counters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestones: Option<MilestoneProgress>,
}

impl GameStatePatch {
    /// Merge this patch over `state`.
    ///
    /// Energy is clamped to the resulting ceiling.
    pub fn apply_to(self, state: GameState) -> GameState {
        let max_energy = self.max_energy.unwrap_or(state.max_energy);
        let energy = self.energy.unwrap_or(state.energy).min(max_energy);
        GameState {
            money: self.money.unwrap_or(state.money),
            reputation: self.reputation.unwrap_or(state.reputation),
            experience: self.experience.unwrap_or(state.experience),
            rank: self.rank.unwrap_or(state.rank),
            energy,
            max_energy,
            inventory: self.inventory.unwrap_or(state.inventory),
            total_patients_treated: self
                .total_patients_treated
                .unwrap_or(state.total_patients_treated),
            case_history: self.case_history.unwrap_or(state.case_history),
            skill_points: self.skill_points.unwrap_or(state.skill_points),
            talents: self.talents.unwrap_or(state.talents),
            milestones: self.milestones.unwrap_or(state.milestones),
        }
    }
}
