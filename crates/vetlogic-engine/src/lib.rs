//! Pure game rules for the `VetLogic` veterinary career game.
//!
//! Everything here operates on [`vetlogic_types`] values without touching
//! I/O. It sits between the shared types and the store/session crates,
//! which handle persistence and collaborator calls.
//!
//! # Modules
//!
//! - [`answer`] -- Single/multiple-choice answer validation and grading
//! - [`config`] -- Tunable rules ([`GameRules`]) with defaults
//! - [`energy`] -- Energy spending and regeneration
//! - [`equipment`] -- Purchases and case data gating
//! - [`error`] -- Error types for all rule operations ([`EngineError`])
//! - [`milestone`] -- Milestone counters and skill point awards
//! - [`rank`] -- Rank ladder, promotion eligibility, qualification
//! - [`reward`] -- Reward policies and talent bonus layering
//! - [`talent`] -- Talent arena, unlock checks, aggregated bonuses

pub mod answer;
pub mod config;
pub mod energy;
pub mod equipment;
pub mod error;
pub mod milestone;
pub mod rank;
pub mod reward;
pub mod talent;

pub use answer::{check_question, grade, validate};
pub use config::GameRules;
pub use error::EngineError;
pub use rank::{PromotionStatus, RankLadder};
pub use reward::{ClinicalPolicy, ExamPolicy, Reward, RewardPolicy};
pub use talent::{TalentBonuses, TalentTree, can_unlock};

use vetlogic_types::{GameState, MilestoneProgress, Rank, default_catalog, default_talents};

/// A brand-new player's state.
pub fn initial_state(rules: &GameRules) -> GameState {
    GameState {
        money: rules.starting.money,
        reputation: rules.starting.reputation,
        experience: 0,
        rank: Rank::Student,
        energy: rules.starting.max_energy,
        max_energy: rules.starting.max_energy,
        inventory: default_catalog(),
        total_patients_treated: 0,
        case_history: Vec::new(),
        skill_points: 0,
        talents: default_talents(),
        milestones: MilestoneProgress::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_matches_rules() {
        let state = initial_state(&GameRules::default());
        assert_eq!(state.money, 5000);
        assert_eq!(state.reputation, 50);
        assert_eq!(state.energy, 100);
        assert_eq!(state.rank, Rank::Student);
        assert!(state.case_history.is_empty());
        assert_eq!(state.inventory.iter().filter(|e| e.owned).count(), 1);
    }
}
